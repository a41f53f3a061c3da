//! Assetsnap Market Data Crate
//!
//! This crate fetches raw market data for exchange-qualified tickers
//! (e.g. `PETR4.SA`, `AAPL`) from an external provider. It does not
//! normalize anything: fallback selection, window filtering and rounding
//! live in `assetsnap-core`.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +----------------------+
//! |  core (builder)  | --> |  MarketDataProvider  |  (trait)
//! +------------------+     +----------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  YahooProvider   |  (quoteSummary + chart)
//!                          +------------------+
//!                                  |
//!                                  v
//!              QuoteSummary / DividendEvent / PriceBar
//! ```
//!
//! # Core Types
//!
//! - [`QuoteSummary`] - Name, sector and the candidate price fields of a ticker
//! - [`DividendEvent`] - A single dividend payment
//! - [`EventTimestamp`] - Timestamp that may or may not carry an offset
//! - [`PriceBar`] - A closing price at a point in time
//! - [`Interval`] - Bar granularity

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::{DividendEvent, EventTimestamp, Interval, PriceBar, QuoteSummary};
pub use provider::yahoo::YahooProvider;
pub use provider::MarketDataProvider;
