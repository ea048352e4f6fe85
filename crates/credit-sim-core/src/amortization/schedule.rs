//! Single-loan amortization schedules.
//!
//! A loan's payment rule is resolved once into a [`PaymentPlan`], then the
//! schedule is produced as a scan over period indices carrying the opening
//! balance. Nothing is rounded here; cent rounding belongs to presentation
//! (see [`super::rounding`]).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::insurance::{insured_capital_at, premium_at};
use super::loan::{AmortizationKind, InsuranceConvention, Loan};
use crate::time_value::{annuity_capital, annuity_payment};
use crate::types::{Money, Periods, Rate};

/// Balance at or below which a loan is considered repaid.
pub const BALANCE_EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single period of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Period number (1-indexed)
    pub period: Periods,
    /// Interest accrued on the opening balance
    pub interest: Money,
    /// Borrower's-insurance premium
    pub insurance: Money,
    /// Principal repaid
    pub principal: Money,
    /// Payment excluding insurance
    pub payment: Money,
    /// Payment including insurance
    pub payment_with_insurance: Money,
    /// Outstanding balance at period end
    pub balance: Money,
    /// Capital covered by the borrower's insurance this period
    pub insured_capital: Money,
}

impl ScheduleRow {
    /// Outstanding balance at the start of the period.
    pub fn opening_balance(&self) -> Money {
        self.balance + self.principal
    }
}

pub type Schedule = Vec<ScheduleRow>;

/// How the payment excluding insurance is determined each period.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentPlan {
    /// Level payment on an amortizing loan.
    Annuity { payment: Money },
    /// Interest only, with an optional payment whose surplus over interest
    /// repays principal early.
    InFine { payment: Option<Money> },
    /// One target payment per period. The schedule spans
    /// `payments.len()` periods.
    Targeted { payments: Vec<Money> },
}

/// A loan with its payment rule resolved and its rates converted to monthly.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLoan {
    /// Effective capital (back-solved when an override payment was accepted)
    pub capital: Money,
    pub rate: Rate,
    pub insurance_rate: Rate,
    pub periods: Periods,
    pub insurance: InsuranceConvention,
    pub plan: PaymentPlan,
    /// Whether the loan's payment override drives the schedule
    pub override_applied: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Full amortization schedule of one loan.
///
/// Non-positive capital or a zero duration yields an empty schedule.
pub fn generate_schedule(loan: &Loan) -> Schedule {
    ResolvedLoan::from_loan(loan).schedule()
}

/// Schedule of `loan` driven by per-period target payments instead of its
/// own payment rule. Interest-only loans keep their kind: the targets are
/// then ignored.
pub fn generate_targeted_schedule(loan: &Loan, payments: Vec<Money>) -> Schedule {
    let mut resolved = ResolvedLoan::from_loan(&loan.without_override());
    if loan.kind == AmortizationKind::Amortizing {
        resolved.periods = payments.len() as Periods;
        resolved.plan = PaymentPlan::Targeted { payments };
    }
    resolved.schedule()
}

impl ResolvedLoan {
    pub fn from_loan(loan: &Loan) -> Self {
        let rate = loan.monthly_rate();
        let periods = loan.periods();
        let capital = loan.capital;

        let (capital, plan, override_applied) = match loan.kind {
            AmortizationKind::Amortizing => match loan.payment_override {
                Some(payment) if override_accepted(payment, capital, rate) => (
                    annuity_capital(payment, rate, periods),
                    PaymentPlan::Annuity { payment },
                    true,
                ),
                _ => (
                    capital,
                    PaymentPlan::Annuity {
                        payment: annuity_payment(capital, rate, periods),
                    },
                    false,
                ),
            },
            AmortizationKind::InterestOnly => {
                let payment = loan.payment_override.filter(|p| *p > Decimal::ZERO);
                (capital, PaymentPlan::InFine { payment }, payment.is_some())
            }
        };

        ResolvedLoan {
            capital,
            rate,
            insurance_rate: loan.monthly_insurance_rate(),
            periods,
            insurance: loan.insurance,
            plan,
            override_applied,
        }
    }

    /// Payment excluding insurance of an amortizing loan, or the interest due
    /// in period 1 for an interest-only loan without override.
    pub fn base_payment(&self) -> Money {
        match &self.plan {
            PaymentPlan::Annuity { payment } => *payment,
            PaymentPlan::InFine { payment } => payment.unwrap_or(self.capital * self.rate),
            PaymentPlan::Targeted { payments } => {
                payments.first().copied().unwrap_or(Decimal::ZERO)
            }
        }
    }

    pub fn schedule(&self) -> Schedule {
        if self.capital <= Decimal::ZERO || self.periods == 0 {
            return Vec::new();
        }

        (1..=self.periods)
            .scan(self.capital, |opening, period| {
                if *opening <= BALANCE_EPSILON {
                    return None;
                }
                let row = self.row(period, *opening);
                *opening = row.balance;
                Some(row)
            })
            .collect()
    }

    fn row(&self, period: Periods, opening: Money) -> ScheduleRow {
        let interest = opening * self.rate;
        let insurance = premium_at(self.insurance, self.insurance_rate, self.capital, opening);

        let principal = if period >= self.periods {
            opening
        } else {
            let principal = self.scheduled_principal(period, opening, interest);
            if opening - principal <= BALANCE_EPSILON {
                opening
            } else {
                principal
            }
        };

        let payment = interest + principal;
        ScheduleRow {
            period,
            interest,
            insurance,
            principal,
            payment,
            payment_with_insurance: payment + insurance,
            balance: opening - principal,
            insured_capital: insured_capital_at(
                self.insurance,
                self.insurance_rate,
                self.capital,
                opening,
            ),
        }
    }

    fn scheduled_principal(&self, period: Periods, opening: Money, interest: Money) -> Money {
        match &self.plan {
            PaymentPlan::Annuity { payment } => {
                amortizing_principal(*payment, interest, opening, self.rate)
            }
            PaymentPlan::Targeted { payments } => {
                let target = payments
                    .get(period as usize - 1)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                amortizing_principal(target, interest, opening, self.rate)
            }
            PaymentPlan::InFine { payment } => match payment {
                Some(p) if *p > interest => (*p - interest).min(opening),
                _ => Decimal::ZERO,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An override replaces the computed annuity only if it covers the first
/// period's interest on the stated capital.
fn override_accepted(payment: Money, capital: Money, rate: Rate) -> bool {
    payment > Decimal::ZERO && payment > capital * rate
}

/// Principal repaid out of `target`, between zero and the opening balance.
/// At a zero rate the whole target repays principal.
fn amortizing_principal(target: Money, interest: Money, opening: Money, rate: Rate) -> Money {
    let principal = if rate.is_zero() {
        target
    } else {
        target - interest
    };
    principal.max(Decimal::ZERO).min(opening)
}
