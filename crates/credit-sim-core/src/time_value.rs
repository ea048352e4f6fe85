//! Period arithmetic shared by every schedule builder.
//!
//! The engine works on uniform monthly periods: annual nominal rates are
//! divided by twelve, start dates collapse to a month difference against the
//! portfolio reference month, and payments follow the standard annuity
//! formula with an explicit zero-rate fallback.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Periods, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Highest annual rate, in percent, the engine computes with. Higher inputs
/// are clamped to it.
pub const MAX_ANNUAL_RATE_PCT: Decimal = dec!(1000);

/// Convert an annual nominal rate in percent to a monthly decimal rate.
/// Negative inputs are clamped to zero, inputs above
/// [`MAX_ANNUAL_RATE_PCT`] to the ceiling.
pub fn monthly_rate(annual_pct: Decimal) -> Rate {
    if annual_pct <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    annual_pct.min(MAX_ANNUAL_RATE_PCT) / PERCENT / MONTHS_PER_YEAR
}

/// (1 + r)^n by repeated multiplication, `None` once it exceeds the
/// `Decimal` range.
pub fn compound_factor(rate: Rate, periods: Periods) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    (0..periods).try_fold(Decimal::ONE, |factor, _| factor.checked_mul(one_plus_r))
}

/// Level payment that amortizes `capital` over `periods` at `rate`.
///
/// `capital * r / (1 - (1+r)^-n)` for r > 0, `capital / n` for r = 0.
pub fn annuity_payment(capital: Money, rate: Rate, periods: Periods) -> Money {
    if periods == 0 {
        return Decimal::ZERO;
    }
    if rate <= Decimal::ZERO {
        return capital / Decimal::from(periods);
    }
    // (1+r)^-n vanishes when the factor overflows
    let discount = compound_factor(rate, periods).map_or(Decimal::ZERO, |f| Decimal::ONE / f);
    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        return capital / Decimal::from(periods);
    }
    capital * rate / denominator
}

/// Inverse of [`annuity_payment`]: the capital a level payment repays.
pub fn annuity_capital(payment: Money, rate: Rate, periods: Periods) -> Money {
    if periods == 0 {
        return Decimal::ZERO;
    }
    if rate <= Decimal::ZERO {
        return payment * Decimal::from(periods);
    }
    let discount = compound_factor(rate, periods).map_or(Decimal::ZERO, |f| Decimal::ONE / f);
    payment * (Decimal::ONE - discount) / rate
}

/// Number of months from `reference` to `start`. Only year and month are
/// significant; the day of month is ignored.
pub fn month_offset(reference: NaiveDate, start: NaiveDate) -> i32 {
    (start.year() - reference.year()) * 12 + start.month() as i32 - reference.month() as i32
}

/// Calendar year of the 0-based axis period `index` counted from `reference`.
pub fn calendar_year(reference: NaiveDate, index: usize) -> i32 {
    let month0 = reference.month0() as usize + index;
    reference.year() + (month0 / 12) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_monthly_rate_from_percent() {
        assert_eq!(monthly_rate(dec!(3.6)), dec!(0.003));
        assert_eq!(monthly_rate(dec!(0)), Decimal::ZERO);
        assert_eq!(monthly_rate(dec!(-2)), Decimal::ZERO);
        assert_eq!(monthly_rate(dec!(5000)), monthly_rate(MAX_ANNUAL_RATE_PCT));
    }

    #[test]
    fn test_annuity_payment_standard_loan() {
        // 200k over 20 years at 3% nominal: ~1109.20 a month
        let pmt = annuity_payment(dec!(200000), monthly_rate(dec!(3)), 240);
        assert!((pmt - dec!(1109.20)).abs() < dec!(0.01));
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        assert_eq!(annuity_payment(dec!(12000), Decimal::ZERO, 24), dec!(500));
        assert_eq!(annuity_payment(dec!(12000), Decimal::ZERO, 0), Decimal::ZERO);
    }

    #[test]
    fn test_annuity_capital_inverts_payment() {
        let r = monthly_rate(dec!(4.2));
        let pmt = annuity_payment(dec!(150000), r, 180);
        let capital = annuity_capital(pmt, r, 180);
        assert!((capital - dec!(150000)).abs() < dec!(0.000001));
        assert_eq!(annuity_capital(dec!(500), Decimal::ZERO, 24), dec!(12000));
    }

    #[test]
    fn test_compound_factor() {
        assert_eq!(compound_factor(dec!(0.1), 2), Some(dec!(1.21)));
        assert_eq!(compound_factor(dec!(0.1), 0), Some(Decimal::ONE));
    }

    #[test]
    fn test_compound_factor_overflow() {
        // 80% a year over 100 years
        let r = monthly_rate(dec!(80));
        assert_eq!(compound_factor(r, 1200), None);
    }

    #[test]
    fn test_annuity_at_overflowing_factor_tends_to_interest() {
        let r = monthly_rate(dec!(80));
        assert_eq!(annuity_payment(dec!(100000), r, 1200), dec!(100000) * r);
        let capital = annuity_capital(dec!(100000) * r, r, 1200);
        assert!((capital - dec!(100000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_month_offset() {
        assert_eq!(month_offset(date(2024, 1), date(2024, 1)), 0);
        assert_eq!(month_offset(date(2024, 1), date(2025, 3)), 14);
        assert_eq!(month_offset(date(2024, 6), date(2023, 11)), -7);
    }

    #[test]
    fn test_calendar_year() {
        let reference = date(2024, 11);
        assert_eq!(calendar_year(reference, 0), 2024);
        assert_eq!(calendar_year(reference, 1), 2024);
        assert_eq!(calendar_year(reference, 2), 2025);
        assert_eq!(calendar_year(reference, 14), 2026);
    }
}
