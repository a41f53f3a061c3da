//! Market data provider trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::MarketDataError;
use crate::models::{DividendEvent, Interval, PriceBar, QuoteSummary};

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use assetsnap_market_data::{MarketDataProvider, QuoteSummary};
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     // ... implement fetch methods
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO". Used for logging.
    fn id(&self) -> &'static str;

    /// Fetch name, sector and current-price candidates for a symbol.
    ///
    /// # Returns
    ///
    /// The summary on success. Fields the provider does not know are `None`;
    /// an unknown symbol is a `MarketDataError::SymbolNotFound`.
    async fn get_quote_summary(&self, symbol: &str) -> Result<QuoteSummary, MarketDataError>;

    /// Fetch the complete dividend history for a symbol.
    ///
    /// # Returns
    ///
    /// All known payments ordered by timestamp ascending. An asset that
    /// never paid a dividend yields an empty vector, not an error.
    async fn get_dividends(&self, symbol: &str) -> Result<Vec<DividendEvent>, MarketDataError>;

    /// Fetch closing prices for a date range.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The provider symbol
    /// * `start` - Start of the date range (inclusive)
    /// * `end` - End of the date range (inclusive)
    /// * `interval` - Bar granularity
    ///
    /// # Returns
    ///
    /// Bars ordered by timestamp ascending. Bars may carry a NaN close.
    async fn get_price_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PriceBar>, MarketDataError>;
}
