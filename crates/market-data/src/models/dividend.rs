use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Point in time attached to a provider event.
///
/// Providers are inconsistent: the chart endpoint reports exchange-local,
/// offset-carrying timestamps while cached or hand-entered data is usually
/// naive. Comparisons always go through [`EventTimestamp::to_naive`] so the
/// two kinds can be mixed freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTimestamp {
    /// Timestamp with a UTC offset
    Aware(DateTime<FixedOffset>),

    /// Timestamp without any offset information
    Naive(NaiveDateTime),
}

impl EventTimestamp {
    /// Drop the offset, keeping the wall-clock reading in that offset.
    pub fn to_naive(&self) -> NaiveDateTime {
        match self {
            Self::Aware(dt) => dt.naive_local(),
            Self::Naive(dt) => *dt,
        }
    }

    /// Calendar date of the wall-clock reading.
    pub fn date(&self) -> NaiveDate {
        self.to_naive().date()
    }

    /// Strictly later than `boundary`.
    pub fn is_after(&self, boundary: NaiveDateTime) -> bool {
        self.to_naive() > boundary
    }

    /// Earlier than or equal to `boundary`.
    pub fn is_on_or_before(&self, boundary: NaiveDateTime) -> bool {
        self.to_naive() <= boundary
    }
}

impl From<DateTime<FixedOffset>> for EventTimestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Aware(dt)
    }
}

impl From<NaiveDateTime> for EventTimestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Naive(dt)
    }
}

/// A single dividend payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    /// When the payment was recorded by the provider
    pub timestamp: EventTimestamp,

    /// Amount per share, in the quote currency
    pub amount: f64,
}

impl DividendEvent {
    pub fn new(timestamp: impl Into<EventTimestamp>, amount: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            amount,
        }
    }
}
