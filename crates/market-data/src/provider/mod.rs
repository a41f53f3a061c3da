//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - The Yahoo Finance provider
//!
//! Providers return raw data. They never pick between fallback fields or
//! filter by date windows; that keeps every provider interchangeable with a
//! test double.

mod traits;

pub mod yahoo;

pub use traits::MarketDataProvider;
