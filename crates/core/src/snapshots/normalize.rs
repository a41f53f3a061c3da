//! Normalization rules applied to raw provider data.
//!
//! Everything here is pure apart from logging: no network, no clock. Window boundaries are passed
//! in as naive date-times and event timestamps are compared through
//! [`EventTimestamp::to_naive`], so aware and naive provider data mix freely.

use chrono::{Duration, NaiveDateTime};
use log::{debug, warn};
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use assetsnap_market_data::{DividendEvent, EventTimestamp, PriceBar, QuoteSummary};

use super::model::{DividendPoint, PricePoint};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, DIVIDEND_DECIMAL_PRECISION, UNKNOWN_SECTOR};

/// Round to `dp` places, ties to even.
///
/// The binary value of the float is kept exactly before rounding, so
/// `2.675` (stored as `2.67499999...`) rounds down like it does everywhere
/// else floats are rounded. `None` when the value is not finite or lies
/// outside the range a `Decimal` can hold.
fn round_f64(value: f64, dp: u32) -> Option<Decimal> {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
}

/// Round a money value to 2 decimal places.
pub fn round_money(value: f64) -> Option<Decimal> {
    round_f64(value, DISPLAY_DECIMAL_PRECISION)
}

/// Round a dividend amount to the provider's precision, kept as a float.
pub fn round_dividend_amount(value: f64) -> f64 {
    round_f64(value, DIVIDEND_DECIMAL_PRECISION)
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// A candidate is usable when finite, representable and still strictly
/// positive after rounding.
fn usable_price(value: Option<f64>) -> Option<Decimal> {
    let raw = value.filter(|v| v.is_finite() && *v > 0.0)?;
    match round_money(raw) {
        Some(price) if price > Decimal::ZERO => Some(price),
        _ => {
            debug!("Ignoring unusable price candidate {}", raw);
            None
        }
    }
}

/// First usable price: regular market price, then current price, then
/// previous close.
pub fn resolve_current_price(summary: &QuoteSummary) -> Option<Decimal> {
    [
        summary.regular_market_price,
        summary.current_price,
        summary.previous_close,
    ]
    .into_iter()
    .find_map(usable_price)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Long name, then short name, then the ticker itself.
pub fn resolve_name(summary: &QuoteSummary, ticker: &str) -> String {
    non_blank(summary.long_name.as_deref())
        .or_else(|| non_blank(summary.short_name.as_deref()))
        .unwrap_or(ticker)
        .to_string()
}

/// Reported sector or `"unknown"`.
pub fn resolve_sector(summary: &QuoteSummary) -> String {
    non_blank(summary.sector.as_deref())
        .unwrap_or(UNKNOWN_SECTOR)
        .to_string()
}

fn within(timestamp: &EventTimestamp, after: NaiveDateTime, until: NaiveDateTime) -> bool {
    timestamp.is_after(after) && timestamp.is_on_or_before(until)
}

/// Sum of dividends paid in `(end - days, end]`, rounded to 2 places.
pub fn trailing_dividend_sum(events: &[DividendEvent], end: NaiveDateTime, days: i64) -> Decimal {
    let start = end - Duration::days(days);
    // Folding from +0.0 keeps an empty window from printing as "-0".
    let total = events
        .iter()
        .filter(|e| within(&e.timestamp, start, end))
        .map(|e| e.amount)
        .filter(|amount| amount.is_finite())
        .fold(0.0, |acc, amount| acc + amount);
    round_money(total).unwrap_or_else(|| {
        warn!("Trailing dividend total {} is out of range; reporting zero", total);
        Decimal::ZERO
    })
}

/// Dividends paid in `(start, end]`, chronological.
pub fn dividend_history(
    events: &[DividendEvent],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<DividendPoint> {
    let mut selected: Vec<&DividendEvent> = events
        .iter()
        .filter(|e| within(&e.timestamp, start, end))
        .collect();
    selected.sort_by_key(|e| e.timestamp.to_naive());

    selected
        .into_iter()
        .map(|e| DividendPoint {
            date: e.timestamp.date(),
            amount: round_dividend_amount(e.amount),
        })
        .collect()
}

/// Bars with a usable close, chronological, close rounded to 2 places.
pub fn monthly_closes(bars: &[PriceBar]) -> Vec<PricePoint> {
    let mut kept: Vec<&PriceBar> = bars.iter().filter(|b| b.has_close()).collect();
    kept.sort_by_key(|b| b.timestamp);

    kept.into_iter()
        .map(|b| PricePoint {
            date: b.timestamp.date_naive(),
            close: round_money(b.close)
                .and_then(|d| d.to_f64())
                .unwrap_or(b.close),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_round_money_ties_to_even() {
        assert_eq!(round_money(38.425), Some(dec!(38.42)));
        assert_eq!(round_money(0.125), Some(dec!(0.12)));
        assert_eq!(round_money(2.675), Some(dec!(2.67)));
        assert_eq!(round_money(1.005001), Some(dec!(1.01)));
        assert_eq!(round_money(0.0), Some(dec!(0)));
    }

    #[test]
    fn test_round_money_rejects_unrepresentable() {
        assert_eq!(round_money(1e30), None);
        assert_eq!(round_money(f64::NAN), None);
        assert_eq!(round_money(f64::INFINITY), None);
        assert!((round_dividend_amount(1e30) - 1e30).abs() < 1.0);
    }

    #[test]
    fn test_out_of_range_price_falls_through_to_next_candidate() {
        let summary = QuoteSummary::new("X")
            .regular_market_price(1e30)
            .current_price(25.5);
        assert_eq!(resolve_current_price(&summary), Some(dec!(25.5)));

        let only_huge = QuoteSummary::new("X").regular_market_price(1e30);
        assert_eq!(resolve_current_price(&only_huge), None);

        // Rounds to 0.00, which is not a price.
        let dust = QuoteSummary::new("X").regular_market_price(0.001).previous_close(3.0);
        assert_eq!(resolve_current_price(&dust), Some(dec!(3)));
    }

    #[test]
    fn test_round_dividend_amount() {
        assert!((round_dividend_amount(0.123456789) - 0.123457).abs() < 1e-12);
        assert_eq!(round_dividend_amount(1.5), 1.5);
    }

    #[test]
    fn test_price_fallback_order() {
        let all = QuoteSummary::new("X")
            .regular_market_price(10.0)
            .current_price(11.0)
            .previous_close(12.0);
        assert_eq!(resolve_current_price(&all), Some(dec!(10)));

        let secondary = QuoteSummary::new("X").current_price(11.111).previous_close(12.0);
        assert_eq!(resolve_current_price(&secondary), Some(dec!(11.11)));

        let tertiary = QuoteSummary::new("X").previous_close(12.0);
        assert_eq!(resolve_current_price(&tertiary), Some(dec!(12)));

        assert_eq!(resolve_current_price(&QuoteSummary::new("X")), None);
    }

    #[test]
    fn test_price_fallback_skips_unusable_values() {
        let summary = QuoteSummary::new("X")
            .regular_market_price(f64::NAN)
            .current_price(0.0)
            .previous_close(9.99);
        assert_eq!(resolve_current_price(&summary), Some(dec!(9.99)));

        let none = QuoteSummary::new("X")
            .regular_market_price(-1.0)
            .current_price(f64::INFINITY);
        assert_eq!(resolve_current_price(&none), None);
    }

    #[test]
    fn test_name_and_sector_fallbacks() {
        let both = QuoteSummary::new("ITSA4.SA").long_name("Itaúsa S.A.").short_name("ITAUSA PN");
        assert_eq!(resolve_name(&both, "ITSA4.SA"), "Itaúsa S.A.");

        let blank_long = QuoteSummary::new("ITSA4.SA").long_name("  ").short_name("ITAUSA PN");
        assert_eq!(resolve_name(&blank_long, "ITSA4.SA"), "ITAUSA PN");

        let bare = QuoteSummary::new("ITSA4.SA");
        assert_eq!(resolve_name(&bare, "ITSA4.SA"), "ITSA4.SA");
        assert_eq!(resolve_sector(&bare), "unknown");
        assert_eq!(
            resolve_sector(&QuoteSummary::new("X").sector("Financial Services")),
            "Financial Services"
        );
    }

    #[test]
    fn test_trailing_sum_boundaries() {
        let end = at(2024, 6, 30);
        let events = vec![
            DividendEvent::new(end - Duration::days(400), 1.50),
            DividendEvent::new(end - Duration::days(100), 2.00),
            // exactly on the lower boundary: excluded
            DividendEvent::new(end - Duration::days(365), 5.00),
            // exactly on the upper boundary: included
            DividendEvent::new(end, 0.25),
            // after the window end: excluded
            DividendEvent::new(end + Duration::days(1), 9.00),
        ];
        assert_eq!(trailing_dividend_sum(&events, end, 365), dec!(2.25));
    }

    #[test]
    fn test_trailing_sum_empty_is_zero() {
        let total = trailing_dividend_sum(&[], at(2024, 6, 30), 365);
        assert_eq!(total, Decimal::ZERO);
        assert!(!total.is_sign_negative());
        assert_eq!(total.to_string(), "0");

        // Events outside the window leave the sum empty as well.
        let stale = vec![DividendEvent::new(at(2020, 1, 1), 1.0)];
        assert_eq!(
            trailing_dividend_sum(&stale, at(2024, 6, 30), 365).to_string(),
            "0"
        );
        assert!(dividend_history(&[], at(2022, 6, 30), at(2024, 6, 30)).is_empty());
    }

    #[test]
    fn test_mixed_timestamps_compare_without_error() {
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let end = at(2024, 6, 30);
        let events = vec![
            DividendEvent::new(brt.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(), 0.40),
            DividendEvent::new(at(2024, 4, 1), 0.60),
            DividendEvent::new(
                Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap().fixed_offset(),
                1.00,
            ),
        ];

        assert_eq!(trailing_dividend_sum(&events, end, 365), dec!(1.00));

        let history = dividend_history(&events, end - Duration::days(730), end);
        let dates: Vec<String> = history.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-04-01", "2024-05-02"]);
    }

    #[test]
    fn test_monthly_closes_drop_nan_and_sort() {
        let bar = |m: u32, close: f64| {
            PriceBar::new(Utc.with_ymd_and_hms(2024, m, 1, 3, 0, 0).unwrap(), close)
        };
        let bars = vec![bar(3, 30.456), bar(1, 10.0), bar(2, f64::NAN), bar(4, 40.1)];

        let points = monthly_closes(&bars);
        let dates: Vec<String> = points.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-03-01", "2024-04-01"]);
        assert!((points[1].close - 30.46).abs() < 1e-9);
    }
}
