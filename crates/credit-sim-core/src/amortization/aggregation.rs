//! Consolidation of aligned schedules into one portfolio schedule.
//!
//! Flow fields (interest, insurance, principal, payments) are summed within a
//! bucket. Stock fields (balance, insured capital) take, for each loan, the
//! last value observed in the bucket and are then summed across loans. A
//! bucket with no active loan carries the previous stock values forward.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::alignment::AlignedSchedule;
use super::rounding::{round_money, Round};
use super::schedule::ScheduleRow;
use crate::time_value::calendar_year;
use crate::types::{Money, Periods};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// One row per monthly period of the common axis
    #[default]
    Period,
    /// One row per calendar year
    Year,
}

/// A row of the consolidated schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRow {
    /// Axis period (1-indexed) for period buckets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Periods>,
    /// Calendar year for annual buckets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub interest: Money,
    pub insurance: Money,
    pub principal: Money,
    pub payment: Money,
    pub payment_with_insurance: Money,
    /// Total outstanding balance at bucket end
    pub balance: Money,
    /// Total insured capital at bucket end
    pub insured_capital: Money,
    /// Loans with at least one row in the bucket
    pub active_loans: usize,
}

impl Round for ConsolidatedRow {
    fn rounded(&self, dp: u32) -> Self {
        ConsolidatedRow {
            interest: round_money(self.interest, dp),
            insurance: round_money(self.insurance, dp),
            principal: round_money(self.principal, dp),
            payment: round_money(self.payment, dp),
            payment_with_insurance: round_money(self.payment_with_insurance, dp),
            balance: round_money(self.balance, dp),
            insured_capital: round_money(self.insured_capital, dp),
            ..self.clone()
        }
    }
}

/// Sum aligned schedules per axis period, or per calendar year counted from
/// `reference_date`.
pub fn aggregate(
    schedules: &[AlignedSchedule],
    bucket: Bucket,
    reference_date: NaiveDate,
) -> Vec<ConsolidatedRow> {
    let length = schedules.iter().map(|s| s.slots.len()).max().unwrap_or(0);

    let ranges: Vec<(Option<Periods>, Option<i32>, std::ops::Range<usize>)> = match bucket {
        Bucket::Period => (0..length)
            .map(|index| (Some(index as Periods + 1), None, index..index + 1))
            .collect(),
        Bucket::Year => year_ranges(reference_date, length)
            .into_iter()
            .map(|(year, range)| (None, Some(year), range))
            .collect(),
    };

    let mut carried = (Decimal::ZERO, Decimal::ZERO);
    ranges
        .into_iter()
        .map(|(period, year, range)| {
            let mut row = consolidate(schedules, range);
            row.period = period;
            row.year = year;
            if row.active_loans == 0 {
                row.balance = carried.0;
                row.insured_capital = carried.1;
            }
            carried = (row.balance, row.insured_capital);
            row
        })
        .collect()
}

/// Consecutive axis ranges sharing a calendar year.
fn year_ranges(reference_date: NaiveDate, length: usize) -> Vec<(i32, std::ops::Range<usize>)> {
    let mut ranges: Vec<(i32, std::ops::Range<usize>)> = Vec::new();
    for index in 0..length {
        let year = calendar_year(reference_date, index);
        match ranges.last_mut() {
            Some((last_year, range)) if *last_year == year => range.end = index + 1,
            _ => ranges.push((year, index..index + 1)),
        }
    }
    ranges
}

fn consolidate(schedules: &[AlignedSchedule], range: std::ops::Range<usize>) -> ConsolidatedRow {
    let mut row = ConsolidatedRow {
        period: None,
        year: None,
        interest: Decimal::ZERO,
        insurance: Decimal::ZERO,
        principal: Decimal::ZERO,
        payment: Decimal::ZERO,
        payment_with_insurance: Decimal::ZERO,
        balance: Decimal::ZERO,
        insured_capital: Decimal::ZERO,
        active_loans: 0,
    };

    for schedule in schedules {
        let mut last: Option<&ScheduleRow> = None;
        for index in range.clone() {
            if let Some(r) = schedule.row_at(index) {
                row.interest += r.interest;
                row.insurance += r.insurance;
                row.principal += r.principal;
                row.payment += r.payment;
                row.payment_with_insurance += r.payment_with_insurance;
                last = Some(r);
            }
        }
        if let Some(r) = last {
            row.balance += r.balance;
            row.insured_capital += r.insured_capital;
            row.active_loans += 1;
        }
    }

    row
}
