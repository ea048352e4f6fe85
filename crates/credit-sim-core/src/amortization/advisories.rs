//! Advisory warnings derived by inspecting inputs and generated schedules.
//!
//! The scheduler never fails on ordinary bad input; it clamps. These checks
//! surface what was clamped or ignored so the caller can show it.

use rust_decimal::Decimal;

use super::loan::{AmortizationKind, Loan, MAX_PERIODS};
use super::schedule::ResolvedLoan;
#[cfg(feature = "portfolio")]
use super::schedule::BALANCE_EPSILON;
#[cfg(feature = "portfolio")]
use super::smoothing::{SmoothingConfig, SmoothingOutcome, SmoothingStatus};
use crate::time_value::MAX_ANNUAL_RATE_PCT;

/// Warnings for one loan. `name` prefixes every message.
pub fn loan_advisories(name: &str, loan: &Loan) -> Vec<String> {
    let mut warnings = Vec::new();

    if loan.capital <= Decimal::ZERO {
        warnings.push(format!(
            "{name}: capital {} is not positive; no schedule generated",
            loan.capital
        ));
    }
    if loan.duration_months == 0 {
        warnings.push(format!("{name}: duration is zero; no schedule generated"));
    }
    if loan.duration_months > MAX_PERIODS {
        warnings.push(format!(
            "{name}: duration of {} months exceeds {MAX_PERIODS}; clamped",
            loan.duration_months
        ));
    }
    if loan.annual_rate_pct < Decimal::ZERO {
        warnings.push(format!(
            "{name}: negative interest rate {}% treated as 0%",
            loan.annual_rate_pct
        ));
    }
    if loan.insurance_rate_pct < Decimal::ZERO {
        warnings.push(format!(
            "{name}: negative insurance rate {}% treated as 0%",
            loan.insurance_rate_pct
        ));
    }
    for (kind, rate) in [
        ("interest", loan.annual_rate_pct),
        ("insurance", loan.insurance_rate_pct),
    ] {
        if rate > MAX_ANNUAL_RATE_PCT {
            warnings.push(format!(
                "{name}: {kind} rate {rate}% exceeds {MAX_ANNUAL_RATE_PCT}%; clamped"
            ));
        }
    }

    if let Some(payment) = loan.payment_override {
        let resolved = ResolvedLoan::from_loan(loan);
        if !resolved.override_applied {
            let interest = loan.capital * resolved.rate;
            warnings.push(match loan.kind {
                AmortizationKind::Amortizing => format!(
                    "{name}: payment {payment} does not cover first-period interest {interest}; \
                     computed annuity used instead"
                ),
                AmortizationKind::InterestOnly => {
                    format!("{name}: payment {payment} is not positive; interest-only payment used")
                }
            });
        }
    }

    warnings
}

/// Warnings when requested smoothing was not applied, or applied with the
/// primary target floored at interest or run past its stated term.
#[cfg(feature = "portfolio")]
pub fn smoothing_advisories(config: &SmoothingConfig, outcome: &SmoothingOutcome) -> Vec<String> {
    if *config == SmoothingConfig::Off {
        return Vec::new();
    }
    match outcome.status {
        SmoothingStatus::NoSecondaryLoans => vec![
            "Smoothing requested but the portfolio has no secondary loans; schedules left unsmoothed"
                .to_string(),
        ],
        SmoothingStatus::InterestOnlyLoan => vec![
            "Smoothing disabled: the portfolio contains an interest-only loan".to_string(),
        ],
        SmoothingStatus::Applied => {
            let mut warnings = Vec::new();
            if let Some(first) = outcome.first_interest_floored_period {
                warnings.push(format!(
                    "Smoothing: primary target below interest due in {} period(s) from period \
                     {first}; payment raised to cover interest",
                    outcome.interest_floored_periods
                ));
            }
            if outcome.balance_at_term > BALANCE_EPSILON {
                warnings.push(format!(
                    "Smoothing: primary balance {} remains at its stated term; repayment runs \
                     {} periods",
                    outcome.balance_at_term, outcome.smoothed_periods
                ));
            }
            warnings
        }
        SmoothingStatus::Off => Vec::new(),
    }
}
