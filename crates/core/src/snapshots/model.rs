//! Snapshot domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Caller-supplied time window.
///
/// `end` anchors every lookback. `start`, when present, replaces the default
/// start of the dividend detail and the price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotWindow {
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
}

impl SnapshotWindow {
    /// Create a window, rejecting `start > end`.
    pub fn new(start: Option<NaiveDate>, end: NaiveDate) -> Result<Self> {
        if let Some(start) = start {
            if start > end {
                return Err(ValidationError::InvalidWindow { start, end }.into());
            }
        }
        Ok(Self { start, end })
    }

    /// Parse a window from ISO `YYYY-MM-DD` strings.
    pub fn parse(start: Option<&str>, end: &str) -> Result<Self> {
        let start = start.map(parse_iso_date).transpose()?;
        let end = parse_iso_date(end)?;
        Self::new(start, end)
    }
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")?)
}

/// A request for one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery {
    pub ticker: String,
    pub window: Option<SnapshotWindow>,
}

impl AssetQuery {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            window: None,
        }
    }

    pub fn with_window(mut self, window: SnapshotWindow) -> Self {
        self.window = Some(window);
        self
    }
}

/// Monthly close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// A dividend payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Normalized record for one ticker at one point in time.
///
/// Built once per run and never mutated. This is the only shape that is
/// serialized to stdout, SQLite and the remote sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub current_price: Decimal,
    pub dividends_12m: Decimal,
    pub price_history: Vec<PricePoint>,
    pub dividend_history: Vec<DividendPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dividend: Option<DividendPoint>,
}

/// Why a ticker produced no snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// None of the price candidates held a usable value.
    NoPrice,
    /// The provider call failed.
    Fetch(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoPrice => write!(f, "no price"),
            SkipReason::Fetch(message) => write!(f, "fetch failed: {}", message),
        }
    }
}

impl From<assetsnap_market_data::MarketDataError> for SkipReason {
    fn from(err: assetsnap_market_data::MarketDataError) -> Self {
        SkipReason::Fetch(err.to_string())
    }
}

/// Per-ticker result of the builder.
pub type SnapshotOutcome = std::result::Result<AssetSnapshot, SkipReason>;
