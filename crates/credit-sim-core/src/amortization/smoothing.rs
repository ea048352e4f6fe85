//! Payment smoothing of a primary loan against secondary loans.
//!
//! Two modes are supported:
//!
//! - **Constant payment**: the combined outlay (primary payment excluding
//!   insurance plus every secondary payment including insurance) is held at a
//!   target fixed in period 1. The primary absorbs the variation and its
//!   duration floats until payoff.
//! - **Constant duration**: a single total annuity `T` is solved in closed
//!   form so the primary, paying `T - O_t` each period, reaches a zero balance
//!   exactly at its stated term:
//!
//!   `T = (C (1+r)^N + sum O_t a_t) / sum a_t`, with `a_t = (1+r)^(N-t)`.
//!
//! In both modes the per-period primary target goes through the ordinary
//! scheduler clamps (floored at interest, capped at interest plus balance,
//! final period clears the balance).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::alignment::DatedSchedule;
use super::loan::{Loan, MAX_PERIODS};
use super::rounding::{round_money, Round};
use super::schedule::{generate_targeted_schedule, Schedule, ScheduleRow};
use crate::time_value::annuity_payment;
use crate::types::{Money, Periods, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Smoothing requested for a portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SmoothingConfig {
    #[default]
    Off,
    ConstantPayment {
        /// Combined monthly outlay to hold; derived from period 1 when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_total: Option<Money>,
    },
    ConstantDuration,
}

/// Whether smoothing ran, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingStatus {
    Applied,
    Off,
    NoSecondaryLoans,
    InterestOnlyLoan,
}

/// Observable effects of smoothing on the primary loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingOutcome {
    pub status: SmoothingStatus,
    /// Constant-payment target or solved constant-duration annuity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_total: Option<Money>,
    /// Primary schedule length without smoothing
    pub unsmoothed_periods: Periods,
    /// Primary schedule length as returned
    pub smoothed_periods: Periods,
    /// `smoothed_periods - unsmoothed_periods`
    pub duration_delta: i64,
    /// Primary balance after its stated duration; zero unless constant-payment
    /// smoothing stretched the repayment
    pub balance_at_term: Money,
    /// Periods whose target did not cover interest and was raised to it
    pub interest_floored_periods: Periods,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_interest_floored_period: Option<Periods>,
}

impl SmoothingOutcome {
    pub fn not_applied(status: SmoothingStatus, periods: Periods) -> Self {
        SmoothingOutcome {
            status,
            target_total: None,
            unsmoothed_periods: periods,
            smoothed_periods: periods,
            duration_delta: 0,
            balance_at_term: Decimal::ZERO,
            interest_floored_periods: 0,
            first_interest_floored_period: None,
        }
    }

    /// Outcome of a smoothing run on a primary with `stated_periods` whose
    /// unsmoothed schedule has `unsmoothed_periods` rows.
    pub fn applied(
        smoothed: &SmoothedPrimary,
        unsmoothed_periods: Periods,
        stated_periods: Periods,
    ) -> Self {
        let smoothed_periods = smoothed.schedule.len() as Periods;
        SmoothingOutcome {
            status: SmoothingStatus::Applied,
            target_total: Some(smoothed.target_total),
            unsmoothed_periods,
            smoothed_periods,
            duration_delta: i64::from(smoothed_periods) - i64::from(unsmoothed_periods),
            balance_at_term: balance_at_term(&smoothed.schedule, stated_periods),
            interest_floored_periods: smoothed.interest_floored.len() as Periods,
            first_interest_floored_period: smoothed.interest_floored.first().copied(),
        }
    }
}

impl Round for SmoothingOutcome {
    fn rounded(&self, dp: u32) -> Self {
        SmoothingOutcome {
            target_total: self.target_total.map(|t| round_money(t, dp)),
            balance_at_term: round_money(self.balance_at_term, dp),
            ..self.clone()
        }
    }
}

/// A recomputed primary schedule and the total it was solved for.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedPrimary {
    pub schedule: Schedule,
    pub target_total: Money,
    /// Periods where the primary target fell short of the interest due
    pub interest_floored: Vec<Periods>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Decide whether smoothing applies. Any interest-only loan disables it, as
/// does an empty secondary list.
pub fn smoothing_status(
    config: &SmoothingConfig,
    primary: &Loan,
    secondaries: &[Loan],
) -> SmoothingStatus {
    if *config == SmoothingConfig::Off {
        return SmoothingStatus::Off;
    }
    if secondaries.is_empty() {
        return SmoothingStatus::NoSecondaryLoans;
    }
    if primary.is_interest_only() || secondaries.iter().any(Loan::is_interest_only) {
        return SmoothingStatus::InterestOnlyLoan;
    }
    SmoothingStatus::Applied
}

/// Secondary outlay `O_t` (payments including insurance) for primary
/// periods `1..=periods`, read on the common axis at
/// `primary_offset + t - 1`.
pub fn secondary_totals(
    primary_offset: i32,
    periods: Periods,
    secondaries: &[DatedSchedule],
) -> Vec<Money> {
    (0..i64::from(periods))
        .map(|t| {
            let index = i64::from(primary_offset) + t;
            secondaries
                .iter()
                .filter_map(|s| s.row_on_axis(index))
                .map(|row| row.payment_with_insurance)
                .sum()
        })
        .collect()
}

/// Constant total annuity that repays `capital` over `others.len()` periods
/// while the borrower also pays `others[t-1]` elsewhere in period `t`.
/// Reduces to the standard annuity when every `O_t` is zero.
pub fn constant_duration_annuity(capital: Money, rate: Rate, others: &[Money]) -> Money {
    if others.is_empty() {
        return Decimal::ZERO;
    }

    // Divided through by (1+r)^N: a_t becomes the discount factor v^t, which
    // stays in range at any rate and duration.
    let v = Decimal::ONE / (Decimal::ONE + rate);
    let mut discount = Decimal::ONE;
    let mut weighted_others = Decimal::ZERO;
    let mut weight_sum = Decimal::ZERO;
    for other in others {
        discount *= v;
        weighted_others += *other * discount;
        weight_sum += discount;
    }

    (capital + weighted_others) / weight_sum
}

/// Hold the combined outlay constant. `target_total` defaults to the base
/// primary annuity plus the period-1 secondary outlay.
pub fn smooth_constant_payment(
    primary: &Loan,
    primary_offset: i32,
    secondaries: &[DatedSchedule],
    target_total: Option<Money>,
) -> SmoothedPrimary {
    let others = secondary_totals(primary_offset, MAX_PERIODS, secondaries);
    let target_total = target_total.unwrap_or_else(|| {
        let base = annuity_payment(primary.capital, primary.monthly_rate(), primary.periods());
        base + others.first().copied().unwrap_or(Decimal::ZERO)
    });
    log::debug!("constant-payment smoothing: target total {target_total}");

    let payments: Vec<Money> = others.iter().map(|other| target_total - *other).collect();
    targeted(primary, payments, target_total)
}

/// Keep the primary's stated duration and solve the constant total annuity
/// that clears its balance at term.
pub fn smooth_constant_duration(
    primary: &Loan,
    primary_offset: i32,
    secondaries: &[DatedSchedule],
) -> SmoothedPrimary {
    let others = secondary_totals(primary_offset, primary.periods(), secondaries);
    let target_total = constant_duration_annuity(primary.capital, primary.monthly_rate(), &others);
    log::debug!(
        "constant-duration smoothing: solved annuity {target_total} over {} periods",
        others.len()
    );

    let payments: Vec<Money> = others.iter().map(|other| target_total - *other).collect();
    targeted(primary, payments, target_total)
}

/// Balance left after `periods` rows; zero when repaid sooner.
pub fn balance_at_term(schedule: &[ScheduleRow], periods: Periods) -> Money {
    periods
        .checked_sub(1)
        .and_then(|index| schedule.get(index as usize))
        .map_or(Decimal::ZERO, |row| row.balance)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn targeted(primary: &Loan, payments: Vec<Money>, target_total: Money) -> SmoothedPrimary {
    let schedule = generate_targeted_schedule(primary, payments.clone());
    let interest_floored = schedule
        .iter()
        .zip(&payments)
        .filter(|(row, target)| **target < row.interest)
        .map(|(row, _)| row.period)
        .collect();
    SmoothedPrimary {
        schedule,
        target_total,
        interest_floored,
    }
}
