//! Multi-loan portfolios: one primary loan, any number of secondary loans,
//! a shared reference month and an optional smoothing mode.
//!
//! A portfolio is an immutable parameter object. Every call rebuilds all
//! schedules from it; the primary is re-derived whenever any loan changes
//! because smoothing couples it to the secondaries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::advisories::{loan_advisories, smoothing_advisories};
use super::aggregation::{aggregate, Bucket, ConsolidatedRow};
use super::alignment::{align_schedules, AlignedSchedule, DatedSchedule};
use super::analysis::{loan_name, validate_loan};
use super::loan::{Loan, MAX_PERIODS};
use super::rounding::{round_money, Round};
use super::schedule::{generate_schedule, Schedule};
use super::smoothing::{
    smooth_constant_duration, smooth_constant_payment, smoothing_status, SmoothingConfig,
    SmoothingOutcome, SmoothingStatus,
};
use super::summary::{summarize, ScheduleSummary};
use crate::error::CreditSimError;
use crate::time_value::month_offset;
use crate::types::{with_metadata, ComputationOutput, Money, Periods};
use crate::CreditSimResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Loan absorbing the smoothing
    pub primary: Loan,
    #[serde(default)]
    pub secondaries: Vec<Loan>,
    /// Month anchoring the common period axis (day is ignored)
    pub reference_date: NaiveDate,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
}

/// Portfolio analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    /// Granularity of the consolidated schedule
    #[serde(default)]
    pub bucket: Bucket,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Per-loan schedules of a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSchedules {
    /// Primary schedule, smoothed when smoothing applied
    pub primary: Schedule,
    /// Secondary schedules in input order
    pub secondaries: Vec<Schedule>,
    /// All schedules on the common axis, primary first
    pub aligned: Vec<AlignedSchedule>,
    pub smoothing: SmoothingOutcome,
}

impl Round for PortfolioSchedules {
    fn rounded(&self, dp: u32) -> Self {
        PortfolioSchedules {
            primary: self.primary.rounded(dp),
            secondaries: self.secondaries.rounded(dp),
            aligned: self.aligned.rounded(dp),
            smoothing: self.smoothing.rounded(dp),
        }
    }
}

/// Complete portfolio analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub schedules: PortfolioSchedules,
    pub consolidated: Vec<ConsolidatedRow>,
    pub primary_summary: ScheduleSummary,
    pub secondary_summaries: Vec<ScheduleSummary>,
    /// Interest plus insurance across every loan
    pub total_cost_of_credit: Money,
}

impl Round for PortfolioAnalysis {
    fn rounded(&self, dp: u32) -> Self {
        PortfolioAnalysis {
            schedules: self.schedules.rounded(dp),
            consolidated: self.consolidated.rounded(dp),
            primary_summary: self.primary_summary.rounded(dp),
            secondary_summaries: self.secondary_summaries.rounded(dp),
            total_cost_of_credit: round_money(self.total_cost_of_credit, dp),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate, smooth when configured and applicable, and align every
/// schedule of the portfolio.
pub fn generate_portfolio_schedules(portfolio: &Portfolio) -> PortfolioSchedules {
    let reference = portfolio.reference_date;
    let primary = &portfolio.primary;
    let primary_offset = primary.offset_from(reference);

    let secondary_dated: Vec<DatedSchedule> = portfolio
        .secondaries
        .iter()
        .map(|loan| DatedSchedule {
            label: loan.label.clone(),
            offset: loan.offset_from(reference),
            rows: generate_schedule(loan),
        })
        .collect();

    let status = smoothing_status(&portfolio.smoothing, primary, &portfolio.secondaries);
    let (primary_rows, smoothing) = if status == SmoothingStatus::Applied {
        let smoothed = match &portfolio.smoothing {
            SmoothingConfig::ConstantPayment { target_total } => {
                smooth_constant_payment(primary, primary_offset, &secondary_dated, *target_total)
            }
            _ => smooth_constant_duration(primary, primary_offset, &secondary_dated),
        };
        let unsmoothed = generate_schedule(&primary.without_override()).len() as Periods;
        let outcome = SmoothingOutcome::applied(&smoothed, unsmoothed, primary.periods());
        (smoothed.schedule, outcome)
    } else {
        log::debug!("smoothing not applied: {status:?}");
        let rows = generate_schedule(primary);
        let periods = rows.len() as Periods;
        (rows, SmoothingOutcome::not_applied(status, periods))
    };

    let mut dated = Vec::with_capacity(secondary_dated.len() + 1);
    dated.push(DatedSchedule {
        label: primary.label.clone(),
        offset: primary_offset,
        rows: primary_rows.clone(),
    });
    dated.extend(secondary_dated.iter().cloned());
    let aligned = align_schedules(&dated);

    PortfolioSchedules {
        primary: primary_rows,
        secondaries: secondary_dated.into_iter().map(|d| d.rows).collect(),
        aligned,
        smoothing,
    }
}

/// Generate the portfolio schedules and consolidate them.
pub fn analyze_portfolio(
    input: &PortfolioInput,
) -> CreditSimResult<ComputationOutput<PortfolioAnalysis>> {
    let start = Instant::now();
    let portfolio = &input.portfolio;
    validate_portfolio(portfolio)?;

    let schedules = generate_portfolio_schedules(portfolio);
    let consolidated = aggregate(&schedules.aligned, input.bucket, portfolio.reference_date);

    let mut warnings = loan_advisories(loan_name(&portfolio.primary, "primary"), &portfolio.primary);
    for (i, loan) in portfolio.secondaries.iter().enumerate() {
        let fallback = format!("secondary {}", i + 1);
        warnings.extend(loan_advisories(loan_name(loan, &fallback), loan));
    }
    warnings.extend(smoothing_advisories(&portfolio.smoothing, &schedules.smoothing));

    let primary_summary = summarize(&schedules.primary);
    let secondary_summaries: Vec<ScheduleSummary> =
        schedules.secondaries.iter().map(|s| summarize(s)).collect();
    let total_cost_of_credit = primary_summary.cost_of_credit
        + secondary_summaries
            .iter()
            .map(|s| s.cost_of_credit)
            .sum::<Money>();

    let methodology = match (&portfolio.smoothing, schedules.smoothing.status) {
        (SmoothingConfig::ConstantPayment { .. }, SmoothingStatus::Applied) => {
            "Multi-loan amortization with constant-payment smoothing"
        }
        (SmoothingConfig::ConstantDuration, SmoothingStatus::Applied) => {
            "Multi-loan amortization with constant-duration smoothing (closed-form annuity)"
        }
        _ => "Multi-loan amortization, unsmoothed",
    };

    let output = PortfolioAnalysis {
        schedules,
        consolidated,
        primary_summary,
        secondary_summaries,
        total_cost_of_credit,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_portfolio(portfolio: &Portfolio) -> CreditSimResult<()> {
    let reference = portfolio.reference_date;
    validate_loan("primary", &portfolio.primary)?;
    validate_start_date("primary", &portfolio.primary, reference)?;
    for (i, loan) in portfolio.secondaries.iter().enumerate() {
        let field = format!("secondaries[{i}]");
        validate_loan(&field, loan)?;
        validate_start_date(&field, loan, reference)?;
    }
    if let SmoothingConfig::ConstantPayment {
        target_total: Some(target),
    } = &portfolio.smoothing
    {
        if *target <= Decimal::ZERO {
            return Err(CreditSimError::InvalidInput {
                field: "smoothing.target_total".into(),
                reason: "Target total payment must be positive".into(),
            });
        }
    }
    Ok(())
}

/// A declared start month must fall inside the same window as `start_offset`.
fn validate_start_date(field: &str, loan: &Loan, reference: NaiveDate) -> CreditSimResult<()> {
    if let Some(start) = loan.start_date {
        if month_offset(reference, start).unsigned_abs() > MAX_PERIODS {
            return Err(CreditSimError::InvalidInput {
                field: format!("{field}.start_date"),
                reason: format!(
                    "Start date must be within {MAX_PERIODS} months of the reference date {reference}"
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::insurance::insured_capital;
    use crate::amortization::loan::{AmortizationKind, InsuranceConvention};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn primary() -> Loan {
        Loan {
            label: Some("primary".into()),
            insurance_rate_pct: dec!(0.3),
            insurance: InsuranceConvention::OnOutstandingBalance,
            ..Loan::amortizing(dec!(200000), dec!(3.2), 240)
        }
    }

    fn car_loan(offset: i32) -> Loan {
        Loan {
            label: Some("car".into()),
            start_offset: offset,
            insurance_rate_pct: dec!(0.2),
            ..Loan::amortizing(dec!(18000), dec!(4.5), 48)
        }
    }

    fn portfolio(secondaries: Vec<Loan>, smoothing: SmoothingConfig) -> Portfolio {
        Portfolio {
            primary: primary(),
            secondaries,
            reference_date: reference(),
            smoothing,
        }
    }

    #[test]
    fn test_without_secondaries_smoothing_is_skipped() {
        let p = portfolio(vec![], SmoothingConfig::ConstantDuration);
        let out = generate_portfolio_schedules(&p);

        assert_eq!(out.smoothing.status, SmoothingStatus::NoSecondaryLoans);
        assert_eq!(out.primary, generate_schedule(&p.primary));
        assert_eq!(out.aligned.len(), 1);
        assert_eq!(out.smoothing.duration_delta, 0);
    }

    #[test]
    fn test_smoothing_off_keeps_own_schedules() {
        let p = portfolio(vec![car_loan(6)], SmoothingConfig::Off);
        let out = generate_portfolio_schedules(&p);

        assert_eq!(out.smoothing.status, SmoothingStatus::Off);
        assert_eq!(out.primary, generate_schedule(&p.primary));
        assert_eq!(out.secondaries[0], generate_schedule(&car_loan(6)));
        assert_eq!(out.aligned[1].row_at(6).unwrap().period, 1);
        assert_eq!(out.aligned[0].slots.len(), 240);
    }

    #[test]
    fn test_interest_only_disables_smoothing() {
        let in_fine = Loan {
            kind: AmortizationKind::InterestOnly,
            ..car_loan(0)
        };
        let p = portfolio(vec![car_loan(0), in_fine], SmoothingConfig::ConstantDuration);
        let out = generate_portfolio_schedules(&p);

        assert_eq!(out.smoothing.status, SmoothingStatus::InterestOnlyLoan);
        assert_eq!(out.primary, generate_schedule(&p.primary));
        assert!(out.smoothing.target_total.is_none());
    }

    #[test]
    fn test_constant_duration_preserves_term() {
        let p = portfolio(vec![car_loan(12)], SmoothingConfig::ConstantDuration);
        let out = generate_portfolio_schedules(&p);

        assert_eq!(out.smoothing.status, SmoothingStatus::Applied);
        assert_eq!(out.primary.len(), 240);
        assert_eq!(out.smoothing.duration_delta, 0);
        assert_eq!(out.primary.last().unwrap().balance, Decimal::ZERO);

        let consolidated = aggregate(&out.aligned, Bucket::Period, reference());
        let total = out.smoothing.target_total.unwrap();
        // combined outlay excluding primary insurance is flat over the term
        for (row, primary_row) in consolidated.iter().zip(&out.primary) {
            let outlay = row.payment_with_insurance - primary_row.insurance;
            assert!((outlay - total).abs() < dec!(0.000001));
        }
    }

    #[test]
    fn test_constant_payment_reports_duration_delta() {
        let p = portfolio(
            vec![car_loan(0)],
            SmoothingConfig::ConstantPayment { target_total: None },
        );
        let out = generate_portfolio_schedules(&p);

        assert_eq!(out.smoothing.status, SmoothingStatus::Applied);
        assert!(out.smoothing.duration_delta < 0);
        assert_eq!(
            out.smoothing.smoothed_periods as usize,
            out.primary.len()
        );
        assert_eq!(out.smoothing.unsmoothed_periods, 240);
        assert_eq!(out.primary.last().unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_start_dates_drive_alignment() {
        let mut car = car_loan(0);
        car.start_date = NaiveDate::from_ymd_opt(2024, 7, 10);
        let p = portfolio(vec![car], SmoothingConfig::Off);
        let out = generate_portfolio_schedules(&p);

        // began six months before the reference month
        assert_eq!(out.aligned[1].offset, -6);
        assert_eq!(out.aligned[1].row_at(0).unwrap().period, 7);
        assert_eq!(out.aligned[1].active_periods(), 42);
    }

    #[test]
    fn test_analyze_portfolio_from_json() {
        let input: PortfolioInput = serde_json::from_str(
            r#"{
                "reference_date": "2025-01-01",
                "primary": {"capital": "200000", "annual_rate_pct": "3.2",
                            "duration_months": 240, "insurance_rate_pct": "0.3"},
                "secondaries": [
                    {"label": "car", "capital": "18000", "annual_rate_pct": "4.5",
                     "duration_months": 48, "start_offset": 3}
                ],
                "smoothing": {"mode": "constant_duration"},
                "bucket": "year"
            }"#,
        )
        .unwrap();
        let out = analyze_portfolio(&input).unwrap();

        assert!(out.warnings.is_empty());
        assert_eq!(
            out.methodology,
            "Multi-loan amortization with constant-duration smoothing (closed-form annuity)"
        );
        assert_eq!(out.result.consolidated.len(), 20);
        assert_eq!(out.result.consolidated[0].year, Some(2025));
        assert_eq!(
            out.result.total_cost_of_credit,
            out.result.primary_summary.cost_of_credit
                + out.result.secondary_summaries[0].cost_of_credit
        );
    }

    #[test]
    fn test_analyze_portfolio_smoothing_warning() {
        let input = PortfolioInput {
            portfolio: portfolio(vec![], SmoothingConfig::ConstantDuration),
            bucket: Bucket::Period,
        };
        let out = analyze_portfolio(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("no secondary loans"));
        assert_eq!(out.methodology, "Multi-loan amortization, unsmoothed");
    }

    #[test]
    fn test_analyze_portfolio_rejects_bad_target() {
        let input = PortfolioInput {
            portfolio: portfolio(
                vec![car_loan(0)],
                SmoothingConfig::ConstantPayment {
                    target_total: Some(dec!(-5)),
                },
            ),
            bucket: Bucket::Period,
        };
        match analyze_portfolio(&input) {
            Err(CreditSimError::InvalidInput { field, .. }) => {
                assert_eq!(field, "smoothing.target_total")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_analyze_portfolio_rejects_far_offset() {
        let mut car = car_loan(0);
        car.start_offset = 2000;
        let input = PortfolioInput {
            portfolio: portfolio(vec![car], SmoothingConfig::Off),
            bucket: Bucket::Period,
        };
        assert!(analyze_portfolio(&input).is_err());
    }

    #[test]
    fn test_analyze_portfolio_rejects_far_start_date() {
        let mut car = car_loan(0);
        car.start_date = NaiveDate::from_ymd_opt(1900, 1, 1);
        let input = PortfolioInput {
            portfolio: portfolio(vec![car], SmoothingConfig::Off),
            bucket: Bucket::Period,
        };
        match analyze_portfolio(&input) {
            Err(CreditSimError::InvalidInput { field, .. }) => {
                assert_eq!(field, "secondaries[0].start_date")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_insured_capital_of_smoothed_primary_with_override() {
        let primary = Loan {
            insurance_rate_pct: dec!(0.3),
            payment_override: Some(dec!(1500)),
            ..Loan::amortizing(dec!(100000), dec!(3), 120)
        };
        let p = Portfolio {
            primary: primary.clone(),
            ..portfolio(vec![car_loan(0)], SmoothingConfig::ConstantDuration)
        };
        let out = generate_portfolio_schedules(&p);
        assert_eq!(out.smoothing.status, SmoothingStatus::Applied);

        let insured = insured_capital(&out.primary, &primary);
        assert_eq!(insured.len(), out.primary.len());
        for (row, capital) in out.primary.iter().zip(&insured) {
            assert_eq!(row.insured_capital, *capital);
        }
        assert_eq!(insured[0], dec!(100000));

        // unsmoothed, the override's back-solved capital is insured
        let own = generate_schedule(&primary);
        let insured = insured_capital(&own, &primary);
        assert!(insured[0] > dec!(150000));
        assert_eq!(insured[0], own[0].insured_capital);
    }

    #[test]
    fn test_target_below_interest_is_reported() {
        // period-1 interest on the primary is about 533, the car outlay about 414
        let input = PortfolioInput {
            portfolio: portfolio(
                vec![car_loan(0)],
                SmoothingConfig::ConstantPayment {
                    target_total: Some(dec!(700)),
                },
            ),
            bucket: Bucket::Period,
        };
        let out = analyze_portfolio(&input).unwrap();
        let smoothing = &out.result.schedules.smoothing;

        assert_eq!(smoothing.first_interest_floored_period, Some(1));
        assert!(smoothing.interest_floored_periods >= 1);
        let first = &out.result.schedules.primary[0];
        assert_eq!(first.principal, Decimal::ZERO);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("below interest due")));
    }

    #[test]
    fn test_balance_at_term_exposes_stretched_repayment() {
        // the car starts two years in, so the default target is the bare
        // primary annuity and the car payments push the primary past term
        let p = portfolio(
            vec![car_loan(24)],
            SmoothingConfig::ConstantPayment { target_total: None },
        );
        let out = generate_portfolio_schedules(&p);
        assert!(out.smoothing.duration_delta > 0);
        assert!(out.smoothing.balance_at_term > Decimal::ZERO);
        assert_eq!(out.smoothing.balance_at_term, out.primary[239].balance);

        let p = portfolio(vec![car_loan(24)], SmoothingConfig::ConstantDuration);
        let out = generate_portfolio_schedules(&p);
        assert_eq!(out.smoothing.balance_at_term, Decimal::ZERO);
        assert_eq!(out.smoothing.interest_floored_periods, 0);
    }

    #[test]
    fn test_portfolio_is_deterministic() {
        let p = portfolio(
            vec![car_loan(-4), car_loan(30)],
            SmoothingConfig::ConstantPayment { target_total: None },
        );
        assert_eq!(
            generate_portfolio_schedules(&p),
            generate_portfolio_schedules(&p)
        );
    }
}
