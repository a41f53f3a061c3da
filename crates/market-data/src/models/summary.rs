use serde::{Deserialize, Serialize};

/// Descriptive data and current-price candidates for a ticker.
///
/// Every field except `symbol` is optional: providers routinely omit
/// fields for thinly traded assets, funds and delisted tickers. Picking
/// between the price candidates is the caller's job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    /// Symbol the summary was requested for
    pub symbol: String,

    /// Full company/fund name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,

    /// Abbreviated name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    /// Business sector (e.g., "Energy")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Quote currency (ISO 4217)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Last regular-session price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_price: Option<f64>,

    /// Current price as reported with the financial data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,

    /// Previous session close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
}

impl QuoteSummary {
    /// Create an empty summary for a symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Set the long name
    pub fn long_name(mut self, name: impl Into<String>) -> Self {
        self.long_name = Some(name.into());
        self
    }

    /// Set the short name
    pub fn short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = Some(name.into());
        self
    }

    /// Set the sector
    pub fn sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Set the regular market price
    pub fn regular_market_price(mut self, price: f64) -> Self {
        self.regular_market_price = Some(price);
        self
    }

    /// Set the current price
    pub fn current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    /// Set the previous close
    pub fn previous_close(mut self, price: f64) -> Self {
        self.previous_close = Some(price);
        self
    }
}
