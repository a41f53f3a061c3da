//! Market data models
//!
//! This module contains the raw data types returned by providers:
//! - `summary` - Descriptive fields and price candidates (QuoteSummary)
//! - `dividend` - Dividend payments and their timestamps (DividendEvent, EventTimestamp)
//! - `bar` - Price history bars and their granularity (PriceBar, Interval)

mod bar;
mod dividend;
mod summary;

pub use bar::{Interval, PriceBar};
pub use dividend::{DividendEvent, EventTimestamp};
pub use summary::QuoteSummary;
