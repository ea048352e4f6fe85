//! Single-loan analysis wrapped in the standard computation envelope.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::advisories::loan_advisories;
use super::loan::{AmortizationKind, Loan, MAX_PERIODS};
use super::rounding::{round_money, Round};
use super::schedule::{ResolvedLoan, Schedule};
use super::summary::{summarize, ScheduleSummary};
use crate::error::CreditSimError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::CreditSimResult;

/// Schedule of one loan with its resolved payment terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    /// Capital actually amortized (back-solved from an accepted override)
    pub effective_capital: Money,
    /// Payment excluding insurance in period 1
    pub base_payment: Money,
    pub override_applied: bool,
    pub schedule: Schedule,
    pub summary: ScheduleSummary,
}

impl Round for LoanAnalysis {
    fn rounded(&self, dp: u32) -> Self {
        LoanAnalysis {
            effective_capital: round_money(self.effective_capital, dp),
            base_payment: round_money(self.base_payment, dp),
            override_applied: self.override_applied,
            schedule: self.schedule.rounded(dp),
            summary: self.summary.rounded(dp),
        }
    }
}

/// Generate and summarise the schedule of a single loan.
pub fn analyze_loan(loan: &Loan) -> CreditSimResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    validate_loan("loan", loan)?;

    let resolved = ResolvedLoan::from_loan(loan);
    let schedule = resolved.schedule();
    let warnings = loan_advisories(loan_name(loan, "loan"), loan);
    let summary = summarize(&schedule);

    let methodology = match loan.kind {
        AmortizationKind::Amortizing => "Level annuity amortization, monthly periods",
        AmortizationKind::InterestOnly => "Interest-only (in fine) amortization, monthly periods",
    };

    let output = LoanAnalysis {
        effective_capital: resolved.capital,
        base_payment: resolved.base_payment(),
        override_applied: resolved.override_applied,
        schedule,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, loan, warnings, elapsed, output))
}

/// Display name of a loan: its label, or `fallback`.
pub(crate) fn loan_name<'a>(loan: &'a Loan, fallback: &'a str) -> &'a str {
    loan.label.as_deref().unwrap_or(fallback)
}

/// Hard limits of the envelope API. Everything else is clamped by the
/// engine and reported as an advisory.
pub(crate) fn validate_loan(field: &str, loan: &Loan) -> CreditSimResult<()> {
    if loan.duration_months > MAX_PERIODS {
        return Err(CreditSimError::InvalidInput {
            field: format!("{field}.duration_months"),
            reason: format!("Duration must not exceed {MAX_PERIODS} months"),
        });
    }
    if loan.start_offset.unsigned_abs() > MAX_PERIODS {
        return Err(CreditSimError::InvalidInput {
            field: format!("{field}.start_offset"),
            reason: format!("Start offset must be within {MAX_PERIODS} months of the reference"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_analyze_loan_envelope() {
        let loan = Loan {
            label: Some("Résidence principale".into()),
            insurance_rate_pct: dec!(0.3),
            ..Loan::amortizing(dec!(100000), dec!(3.5), 24)
        };
        let out = analyze_loan(&loan).unwrap();

        assert!(out.warnings.is_empty());
        assert_eq!(out.methodology, "Level annuity amortization, monthly periods");
        assert_eq!(out.result.schedule.len(), 24);
        assert_eq!(out.result.summary.total_insurance, dec!(600));
        assert_eq!(out.result.effective_capital, dec!(100000));
        assert!(!out.result.override_applied);
        assert_eq!(out.assumptions["capital"], "100000");
    }

    #[test]
    fn test_analyze_loan_reports_empty_schedule() {
        let loan = Loan::amortizing(Decimal::ZERO, dec!(3.5), 24);
        let out = analyze_loan(&loan).unwrap();
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].starts_with("loan: capital 0"));
    }

    #[test]
    fn test_analyze_loan_rejects_excessive_duration() {
        let loan = Loan::amortizing(dec!(1000), dec!(1), 1500);
        match analyze_loan(&loan) {
            Err(CreditSimError::InvalidInput { field, .. }) => {
                assert_eq!(field, "loan.duration_months")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_rounded_envelope() {
        let loan = Loan::amortizing(dec!(100000), dec!(3.5), 24);
        let out = analyze_loan(&loan).unwrap().rounded(2);
        assert!(out.result.schedule.iter().all(|r| r.balance.scale() <= 2));
        assert!(out.result.base_payment.scale() <= 2);
    }
}
