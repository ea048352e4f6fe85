//! Insured ("death") capital under the two borrower's-insurance conventions.
//!
//! The same formula serves a single loan and a consolidated portfolio: the
//! insured capital is the initial capital or the opening balance, and zero
//! whenever the insurance rate is zero. The premium is that base times the
//! monthly insurance rate.

use rust_decimal::Decimal;

use super::loan::{InsuranceConvention, Loan};
use super::schedule::{ResolvedLoan, ScheduleRow};
use crate::types::{Money, Rate};

/// Insured capital for one period.
pub fn insured_capital_at(
    convention: InsuranceConvention,
    insurance_rate: Rate,
    capital: Money,
    opening_balance: Money,
) -> Money {
    if insurance_rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match convention {
        InsuranceConvention::OnInitialCapital => capital,
        InsuranceConvention::OnOutstandingBalance => opening_balance,
    }
}

/// Insurance premium for one period.
pub fn premium_at(
    convention: InsuranceConvention,
    insurance_rate: Rate,
    capital: Money,
    opening_balance: Money,
) -> Money {
    insured_capital_at(convention, insurance_rate, capital, opening_balance) * insurance_rate
}

/// Insured capital for every row of `schedule`, aligned 1:1 with it.
///
/// The opening balance of a row is recovered as `balance + principal`, so the
/// result does not depend on the `insured_capital` already stored in the rows.
/// `schedule` may come from the loan's own terms or from smoothing, which
/// ignores the payment override; the initial capital is whichever of the two
/// the first row opens on.
pub fn insured_capital(schedule: &[ScheduleRow], loan: &Loan) -> Vec<Money> {
    let insurance_rate = loan.monthly_insurance_rate();
    let capital = schedule_capital(schedule, loan);
    schedule
        .iter()
        .map(|row| {
            insured_capital_at(loan.insurance, insurance_rate, capital, row.opening_balance())
        })
        .collect()
}

/// Capital `schedule` was generated on: the stated capital, or the capital
/// back-solved from an accepted payment override.
fn schedule_capital(schedule: &[ScheduleRow], loan: &Loan) -> Money {
    let resolved = ResolvedLoan::from_loan(loan).capital;
    match schedule.first() {
        Some(first) if resolved != loan.capital => {
            let opening = first.opening_balance();
            if (opening - loan.capital).abs() <= (opening - resolved).abs() {
                loan.capital
            } else {
                resolved
            }
        }
        _ => resolved,
    }
}
