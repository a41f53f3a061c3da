//! Builder configuration and window resolution.

use chrono::{DateTime, Duration, Months, NaiveDateTime, NaiveTime, Utc};

use assetsnap_market_data::Interval;

use super::model::SnapshotWindow;
use crate::constants::{
    DEFAULT_DIVIDEND_HISTORY_DAYS, DEFAULT_DIVIDEND_LOOKBACK_DAYS, DEFAULT_PRICE_HISTORY_MONTHS,
};

/// Lookbacks used by the snapshot builder.
///
/// Passed to the builder at construction; nothing reads process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSettings {
    /// Lookback of the trailing dividend aggregate
    pub dividend_lookback_days: i64,
    /// Lookback of the dividend detail history
    pub dividend_history_days: i64,
    /// Span of the price history
    pub price_history_months: u32,
    /// Granularity of the price history
    pub price_interval: Interval,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            dividend_lookback_days: DEFAULT_DIVIDEND_LOOKBACK_DAYS,
            dividend_history_days: DEFAULT_DIVIDEND_HISTORY_DAYS,
            price_history_months: DEFAULT_PRICE_HISTORY_MONTHS,
            price_interval: Interval::Monthly,
        }
    }
}

/// Concrete boundaries for one run.
///
/// All boundaries are naive: the provider's timestamps are compared on their
/// wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotBounds {
    /// Inclusive end of every window
    pub end: NaiveDateTime,
    /// Exclusive start of the dividend detail history
    pub dividend_history_start: NaiveDateTime,
    /// Start of the price history request
    pub price_start: NaiveDateTime,
}

impl SnapshotBounds {
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.and_utc()
    }

    pub fn price_start_utc(&self) -> DateTime<Utc> {
        self.price_start.and_utc()
    }
}

impl SnapshotSettings {
    /// Resolve the boundaries for a run.
    ///
    /// Without a window the run ends at `now`, a UTC wall-clock reading.
    /// With one it ends at the last second of `window.end`, and
    /// `window.start` (if any) replaces the default starts of both histories.
    pub fn bounds(&self, window: Option<&SnapshotWindow>, now: NaiveDateTime) -> SnapshotBounds {
        let end = match window {
            Some(w) => w.end.and_time(end_of_day()),
            None => now,
        };

        let explicit_start = window
            .and_then(|w| w.start)
            .map(|d| d.and_time(NaiveTime::MIN));

        let dividend_history_start = explicit_start
            .unwrap_or_else(|| end - Duration::days(self.dividend_history_days));

        let price_start = explicit_start.unwrap_or_else(|| {
            end.checked_sub_months(Months::new(self.price_history_months))
                .unwrap_or(NaiveDateTime::MIN)
        });

        SnapshotBounds {
            end,
            dividend_history_start,
            price_start,
        }
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = SnapshotSettings::default();
        assert_eq!(settings.dividend_lookback_days, 365);
        assert_eq!(settings.dividend_history_days, 730);
        assert_eq!(settings.price_history_months, 24);
        assert_eq!(settings.price_interval, Interval::Monthly);
    }

    #[test]
    fn test_bounds_without_window_end_now() {
        let now = date(2024, 6, 15).and_hms_opt(10, 30, 0).unwrap();
        let bounds = SnapshotSettings::default().bounds(None, now);

        assert_eq!(bounds.end, now);
        assert_eq!(bounds.dividend_history_start, now - Duration::days(730));
        assert_eq!(
            bounds.price_start,
            date(2022, 6, 15).and_hms_opt(10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_bounds_with_window_end_only() {
        let window = SnapshotWindow::new(None, date(2024, 6, 30)).unwrap();
        let bounds = SnapshotSettings::default().bounds(Some(&window), NaiveDateTime::MIN);

        assert_eq!(bounds.end, date(2024, 6, 30).and_hms_opt(23, 59, 59).unwrap());
        assert_eq!(
            bounds.price_start,
            date(2022, 6, 30).and_hms_opt(23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_window_start_overrides_histories() {
        let window = SnapshotWindow::new(Some(date(2024, 1, 1)), date(2024, 6, 30)).unwrap();
        let bounds = SnapshotSettings::default().bounds(Some(&window), NaiveDateTime::MIN);

        let start = date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(bounds.dividend_history_start, start);
        assert_eq!(bounds.price_start, start);
        assert_eq!(bounds.price_start_utc().to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
