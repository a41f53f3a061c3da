//! Yahoo Finance market data provider.
//!
//! Two Yahoo endpoints are used:
//! - quoteSummary (price, summaryProfile, summaryDetail, financialData) for
//!   names, sector and the current-price candidates. It requires a
//!   cookie/crumb pair which is fetched lazily and cached on the provider.
//! - chart (through `yahoo_finance_api`) for dividend events and price bars.

mod models;

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header;
use time::OffsetDateTime;
use tracing::{debug, warn};
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{DividendEvent, Interval, PriceBar, QuoteSummary};
use crate::provider::MarketDataProvider;

use models::{raw, YahooQuoteSummaryResponse, YahooQuoteSummaryResult};

const PROVIDER_ID: &str = "YAHOO";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const QUOTE_SUMMARY_MODULES: &str = "price,summaryProfile,summaryDetail,financialData";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    client: reqwest::Client,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            MarketDataError::provider(
                PROVIDER_ID,
                format!("Failed to initialize Yahoo connector: {}", e),
            )
        })?;
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            connector,
            client,
            crumb: RwLock::new(None),
        })
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        {
            let guard = self.crumb.read().unwrap_or_else(|e| e.into_inner());
            if let Some(crumb) = guard.as_ref() {
                return Ok(crumb.clone());
            }
        }

        self.fetch_crumb().await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: Get cookie from fc.yahoo.com
        let response = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .await
            .map_err(|e| {
                MarketDataError::provider(PROVIDER_ID, format!("Failed to get cookie: {}", e))
            })?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "Failed to parse Yahoo cookie"))?;

        // Step 2: Get crumb using cookie
        let crumb = self
            .client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| {
                MarketDataError::provider(PROVIDER_ID, format!("Failed to get crumb: {}", e))
            })?
            .text()
            .await
            .map_err(|e| {
                MarketDataError::provider(PROVIDER_ID, format!("Failed to read crumb: {}", e))
            })?;

        let crumb_data = CrumbData { cookie, crumb };

        let mut guard = self.crumb.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        let mut guard = self.crumb.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Convert chrono DateTime<Utc> to time::OffsetDateTime for the Yahoo API.
    fn chrono_to_offset_datetime(dt: DateTime<Utc>) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    /// Map connector errors, treating "nothing returned" as an unknown symbol.
    fn map_connector_error(symbol: &str, e: yahoo::YahooError) -> MarketDataError {
        if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
            MarketDataError::SymbolNotFound(symbol.to_string())
        } else {
            MarketDataError::provider(PROVIDER_ID, e.to_string())
        }
    }
}

/// Build a dividend event from a chart event (unix seconds, amount).
///
/// Chart events are reported in UTC; the offset is kept so the event stays
/// an aware timestamp.
fn dividend_event(date: i64, amount: f64) -> Result<DividendEvent, MarketDataError> {
    let timestamp = Utc
        .timestamp_opt(date, 0)
        .single()
        .ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Invalid dividend timestamp: {}", date),
        })?;

    Ok(DividendEvent::new(timestamp.fixed_offset(), amount))
}

/// Build a price bar from a chart quote (unix seconds, close).
fn price_bar(timestamp: i64, close: f64) -> Result<PriceBar, MarketDataError> {
    let timestamp = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Invalid timestamp: {}", timestamp),
        })?;

    Ok(PriceBar::new(timestamp, close))
}

/// Map a quoteSummary result to a QuoteSummary.
fn map_quote_summary(symbol: &str, result: &YahooQuoteSummaryResult) -> QuoteSummary {
    let price = result.price.as_ref();
    let profile = result.summary_profile.as_ref();
    let detail = result.summary_detail.as_ref();
    let financial = result.financial_data.as_ref();

    QuoteSummary {
        symbol: symbol.to_string(),
        long_name: price
            .and_then(|p| p.long_name.as_deref())
            .and_then(format_name),
        short_name: price
            .and_then(|p| p.short_name.as_deref())
            .and_then(format_name),
        sector: profile
            .and_then(|s| s.sector.as_deref())
            .filter(|s| !s.trim().is_empty())
            .map(format_sector),
        currency: price
            .and_then(|p| p.currency.clone())
            .or_else(|| detail.and_then(|d| d.currency.clone())),
        regular_market_price: raw(price.and_then(|p| p.regular_market_price.as_ref())),
        current_price: raw(financial.and_then(|f| f.current_price.as_ref())),
        previous_close: raw(detail.and_then(|d| d.previous_close.as_ref())),
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_quote_summary(&self, symbol: &str) -> Result<QuoteSummary, MarketDataError> {
        debug!("Fetching quote summary for {} from Yahoo", symbol);

        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            encode(symbol),
            QUOTE_SUMMARY_MODULES,
            encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| {
                MarketDataError::provider(PROVIDER_ID, format!("Quote summary request failed: {}", e))
            })?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.clear_crumb();
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                "Yahoo authentication expired",
            ));
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        let data: YahooQuoteSummaryResponse = response.json().await.map_err(|e| {
            MarketDataError::provider(
                PROVIDER_ID,
                format!("Failed to parse quote summary response: {}", e),
            )
        })?;

        if let Some(error) = data.quote_summary.error.as_ref() {
            debug!(
                "Yahoo quote summary error for {}: {:?} {:?}",
                symbol, error.code, error.description
            );
        }

        let result = data
            .quote_summary
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        Ok(map_quote_summary(symbol, &result))
    }

    async fn get_dividends(&self, symbol: &str) -> Result<Vec<DividendEvent>, MarketDataError> {
        debug!("Fetching dividend history for {} from Yahoo", symbol);

        let response = self
            .connector
            .get_quote_range(symbol, "1mo", "max")
            .await
            .map_err(|e| Self::map_connector_error(symbol, e))?;

        let dividends = match response.dividends() {
            Ok(dividends) => dividends,
            Err(yahoo::YahooError::NoQuotes) => return Ok(vec![]),
            Err(e) => return Err(MarketDataError::provider(PROVIDER_ID, e.to_string())),
        };

        let mut events: Vec<DividendEvent> = dividends
            .into_iter()
            .filter_map(|d| match dividend_event(d.date as i64, d.amount) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Skipping dividend for {}: {}", symbol, e);
                    None
                }
            })
            .collect();

        events.sort_by_key(|e| e.timestamp.to_naive());

        Ok(events)
    }

    async fn get_price_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        debug!(
            "Fetching {} price history for {} from {} to {} from Yahoo",
            interval,
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let start_time = Self::chrono_to_offset_datetime(start);
        let end_time = Self::chrono_to_offset_datetime(end);

        let response = self
            .connector
            .get_quote_history_interval(symbol, start_time, end_time, interval.as_code())
            .await
            .map_err(|e| Self::map_connector_error(symbol, e))?;

        match response.quotes() {
            Ok(yahoo_quotes) => {
                let mut bars: Vec<PriceBar> = yahoo_quotes
                    .into_iter()
                    .filter_map(|q| match price_bar(q.timestamp as i64, q.close) {
                        Ok(bar) => Some(bar),
                        Err(e) => {
                            warn!("Skipping bar due to conversion error: {}", e);
                            None
                        }
                    })
                    .collect();

                if bars.is_empty() {
                    return Err(MarketDataError::NoDataForRange);
                }

                bars.sort_by_key(|b| b.timestamp);
                Ok(bars)
            }
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(
                    "No price history returned for '{}' between {} and {}",
                    symbol,
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                );
                Err(MarketDataError::NoDataForRange)
            }
            Err(e) => Err(MarketDataError::provider(PROVIDER_ID, e.to_string())),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Clean up a display name. Returns `None` when nothing is left.
fn format_name(name: &str) -> Option<String> {
    let replacements = [
        ("&amp;", "&"),
        ("Amundi Index Solutions - ", ""),
        ("iShares ETF (CH) - ", ""),
        ("iShares VII PLC - ", ""),
        ("Vanguard Index Funds - ", ""),
        ("Xtrackers (IE) Plc - ", ""),
    ];

    let mut name = name.to_string();
    for (from, to) in &replacements {
        name = name.replace(from, to);
    }

    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Convert snake_case sector to Title Case.
fn format_sector(sector: &str) -> String {
    sector
        .replace("&amp;", "&")
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
