//! Totals over a schedule: cost of credit and payoff period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::ScheduleRow;
use crate::types::{Money, Periods};

/// Aggregate figures of one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Number of generated periods
    pub periods: Periods,
    pub total_interest: Money,
    pub total_insurance: Money,
    pub total_principal: Money,
    /// Sum of payments including insurance
    pub total_paid: Money,
    /// Interest plus insurance
    pub cost_of_credit: Money,
    /// Balance after the last generated period
    pub final_balance: Money,
}

pub fn summarize(schedule: &[ScheduleRow]) -> ScheduleSummary {
    let total_interest: Money = schedule.iter().map(|r| r.interest).sum();
    let total_insurance: Money = schedule.iter().map(|r| r.insurance).sum();
    let total_principal: Money = schedule.iter().map(|r| r.principal).sum();
    let total_paid: Money = schedule.iter().map(|r| r.payment_with_insurance).sum();

    ScheduleSummary {
        periods: schedule.len() as Periods,
        total_interest,
        total_insurance,
        total_principal,
        total_paid,
        cost_of_credit: total_interest + total_insurance,
        final_balance: schedule.last().map_or(Decimal::ZERO, |r| r.balance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::loan::Loan;
    use crate::amortization::schedule::generate_schedule;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_of_interest_only_loan() {
        let loan = Loan {
            kind: crate::amortization::loan::AmortizationKind::InterestOnly,
            insurance_rate_pct: dec!(0.12),
            ..Loan::amortizing(dec!(100000), dec!(1.2), 12)
        };
        let summary = summarize(&generate_schedule(&loan));

        assert_eq!(summary.periods, 12);
        assert_eq!(summary.total_interest, dec!(1200));
        assert_eq!(summary.total_insurance, dec!(120));
        assert_eq!(summary.total_principal, dec!(100000));
        assert_eq!(summary.cost_of_credit, dec!(1320));
        assert_eq!(summary.total_paid, dec!(101320));
        assert_eq!(summary.final_balance, Decimal::ZERO);
    }

    #[test]
    fn test_summary_of_empty_schedule() {
        let summary = summarize(&[]);
        assert_eq!(summary.periods, 0);
        assert_eq!(summary.total_paid, Decimal::ZERO);
        assert_eq!(summary.final_balance, Decimal::ZERO);
    }
}
