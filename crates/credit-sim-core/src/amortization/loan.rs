//! Loan parameters as supplied by the caller.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{month_offset, monthly_rate};
use crate::types::{Money, Periods, Rate};

/// Longest supported schedule and widest supported start offset, in months.
pub const MAX_PERIODS: Periods = 1200;

/// How the principal is repaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationKind {
    /// Level payments covering interest and principal.
    #[default]
    Amortizing,
    /// Interest only ("in fine"), principal repaid in the final period.
    InterestOnly,
}

/// Base on which the borrower's-insurance premium is charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceConvention {
    /// Constant premium on the initial capital.
    #[default]
    OnInitialCapital,
    /// Premium on the outstanding balance at the start of each period.
    OnOutstandingBalance,
}

/// A single loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Free-text name shown next to the loan's schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Borrowed capital
    pub capital: Money,
    /// Annual nominal rate in percent (3.5 = 3.5%)
    pub annual_rate_pct: Decimal,
    /// Annual borrower's-insurance rate in percent
    #[serde(default)]
    pub insurance_rate_pct: Decimal,
    /// Duration in monthly periods
    pub duration_months: Periods,
    #[serde(default)]
    pub kind: AmortizationKind,
    #[serde(default)]
    pub insurance: InsuranceConvention,
    /// Start relative to the portfolio reference month, in periods
    #[serde(default)]
    pub start_offset: i32,
    /// Declared start month; when present it takes precedence over
    /// `start_offset`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// User-entered payment excluding insurance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_override: Option<Money>,
}

impl Loan {
    /// An amortizing loan starting at the reference month, no insurance.
    pub fn amortizing(capital: Money, annual_rate_pct: Decimal, duration_months: Periods) -> Self {
        Loan {
            label: None,
            capital,
            annual_rate_pct,
            insurance_rate_pct: Decimal::ZERO,
            duration_months,
            kind: AmortizationKind::Amortizing,
            insurance: InsuranceConvention::OnInitialCapital,
            start_offset: 0,
            start_date: None,
            payment_override: None,
        }
    }

    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.annual_rate_pct)
    }

    pub fn monthly_insurance_rate(&self) -> Rate {
        monthly_rate(self.insurance_rate_pct)
    }

    /// Duration clamped to the supported window.
    pub fn periods(&self) -> Periods {
        self.duration_months.min(MAX_PERIODS)
    }

    pub fn is_interest_only(&self) -> bool {
        self.kind == AmortizationKind::InterestOnly
    }

    /// Start offset against `reference`, clamped to +/- `MAX_PERIODS`.
    pub fn offset_from(&self, reference: NaiveDate) -> i32 {
        let raw = match self.start_date {
            Some(start) => month_offset(reference, start),
            None => self.start_offset,
        };
        let bound = MAX_PERIODS as i32;
        raw.clamp(-bound, bound)
    }

    /// Copy of the loan with the payment override removed.
    pub fn without_override(&self) -> Self {
        Loan {
            payment_override: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 15).unwrap()
    }

    #[test]
    fn test_start_date_overrides_offset() {
        let mut loan = Loan::amortizing(dec!(50000), dec!(2), 60);
        loan.start_offset = 3;
        assert_eq!(loan.offset_from(date(2024, 1)), 3);

        loan.start_date = Some(date(2023, 10));
        assert_eq!(loan.offset_from(date(2024, 1)), -3);
    }

    #[test]
    fn test_offset_is_clamped() {
        let mut loan = Loan::amortizing(dec!(50000), dec!(2), 60);
        loan.start_offset = -5000;
        assert_eq!(loan.offset_from(date(2024, 1)), -1200);
    }

    #[test]
    fn test_deserialize_defaults() {
        let loan: Loan = serde_json::from_str(
            r#"{"capital": "100000", "annual_rate_pct": "3.5", "duration_months": 24}"#,
        )
        .unwrap();
        assert_eq!(loan.kind, AmortizationKind::Amortizing);
        assert_eq!(loan.insurance, InsuranceConvention::OnInitialCapital);
        assert_eq!(loan.insurance_rate_pct, Decimal::ZERO);
        assert_eq!(loan.start_offset, 0);
        assert!(loan.payment_override.is_none());
    }

    #[test]
    fn test_deserialize_enums_snake_case() {
        let loan: Loan = serde_json::from_str(
            r#"{"capital": 1000, "annual_rate_pct": 1, "duration_months": 12,
                "kind": "interest_only", "insurance": "on_outstanding_balance"}"#,
        )
        .unwrap();
        assert!(loan.is_interest_only());
        assert_eq!(loan.insurance, InsuranceConvention::OnOutstandingBalance);
    }
}
