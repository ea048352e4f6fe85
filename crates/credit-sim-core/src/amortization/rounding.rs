//! Cent rounding at the presentation boundary.
//!
//! The engine keeps full decimal precision through scheduling, smoothing and
//! aggregation. Callers round once, just before display or export.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::schedule::ScheduleRow;
use super::summary::ScheduleSummary;
use crate::types::{ComputationOutput, Money};

/// Two decimal places: cents.
pub const CENTS: u32 = 2;

pub fn round_money(value: Money, dp: u32) -> Money {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Copy of a result with every money field rounded to `dp` places.
pub trait Round {
    fn rounded(&self, dp: u32) -> Self;
}

impl Round for Decimal {
    fn rounded(&self, dp: u32) -> Self {
        round_money(*self, dp)
    }
}

impl<T: Round> Round for Vec<T> {
    fn rounded(&self, dp: u32) -> Self {
        self.iter().map(|item| item.rounded(dp)).collect()
    }
}

impl<T: Round> Round for Option<T> {
    fn rounded(&self, dp: u32) -> Self {
        self.as_ref().map(|item| item.rounded(dp))
    }
}

impl<T: Round + Serialize> Round for ComputationOutput<T> {
    fn rounded(&self, dp: u32) -> Self {
        ComputationOutput {
            result: self.result.rounded(dp),
            methodology: self.methodology.clone(),
            assumptions: self.assumptions.clone(),
            warnings: self.warnings.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl Round for ScheduleRow {
    fn rounded(&self, dp: u32) -> Self {
        ScheduleRow {
            period: self.period,
            interest: round_money(self.interest, dp),
            insurance: round_money(self.insurance, dp),
            principal: round_money(self.principal, dp),
            payment: round_money(self.payment, dp),
            payment_with_insurance: round_money(self.payment_with_insurance, dp),
            balance: round_money(self.balance, dp),
            insured_capital: round_money(self.insured_capital, dp),
        }
    }
}

impl Round for ScheduleSummary {
    fn rounded(&self, dp: u32) -> Self {
        ScheduleSummary {
            periods: self.periods,
            total_interest: round_money(self.total_interest, dp),
            total_insurance: round_money(self.total_insurance, dp),
            total_principal: round_money(self.total_principal, dp),
            total_paid: round_money(self.total_paid, dp),
            cost_of_credit: round_money(self.cost_of_credit, dp),
            final_balance: round_money(self.final_balance, dp),
        }
    }
}

/// Round every row of a schedule.
pub fn round_schedule(rows: &[ScheduleRow], dp: u32) -> Vec<ScheduleRow> {
    rows.iter().map(|row| row.rounded(dp)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::loan::Loan;
    use crate::amortization::schedule::generate_schedule;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005), CENTS), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005), CENTS), dec!(-1.01));
        assert_eq!(round_money(dec!(1.0049), CENTS), dec!(1.00));
    }

    #[test]
    fn test_round_schedule_keeps_engine_values_untouched() {
        let loan = Loan::amortizing(dec!(100000), dec!(3.5), 24);
        let schedule = generate_schedule(&loan);
        let rounded = round_schedule(&schedule, CENTS);

        assert_eq!(rounded.len(), schedule.len());
        assert!(rounded.iter().all(|r| r.payment.scale() <= 2));
        assert!(schedule[0].payment.scale() > 2);
        assert_eq!(rounded[0].payment, round_money(schedule[0].payment, CENTS));
    }
}
