//! HTTP client for a Supabase project's PostgREST API.
//!
//! The snapshot batch is handed to a database function through
//! `/rest/v1/rpc/{function}`, which upserts rows keyed by ticker. Known
//! tickers are read straight from the table.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::collections::HashSet;
use std::time::Duration;

use crate::models::{ApiErrorResponse, BulkUpsertRequest, TickerRow};
use assetsnap_core::errors::{Error, Result, ValidationError};
use assetsnap_core::snapshots::{AssetSnapshot, IdentifierSource, SnapshotSink};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Database function that upserts a batch of assets.
pub const DEFAULT_RPC_FUNCTION: &str = "bulk_upsert_assets";

/// Table holding one row per ticker.
pub const DEFAULT_ASSETS_TABLE: &str = "financial_assets";

/// Connection settings for the hosted database.
///
/// There is no built-in project or key: both must come from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub api_key: String,
    pub rpc_function: String,
    pub assets_table: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            rpc_function: DEFAULT_RPC_FUNCTION.to_string(),
            assets_table: DEFAULT_ASSETS_TABLE.to_string(),
        }
    }
}

/// Client for the hosted `financial_assets` table.
///
/// # Example
///
/// ```ignore
/// let config = SupabaseConfig::new("https://project.supabase.co", key);
/// let client = SupabaseClient::new(&config)?;
/// client.bulk_upsert_assets(&snapshots).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    rpc_function: String,
    assets_table: String,
    api_key: HeaderValue,
    auth_header: HeaderValue,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the URL or key is blank or the key
    /// cannot be used as a header value, and an unexpected error if the HTTP
    /// client cannot be initialized.
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let base_url = config.url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ValidationError::MissingField("SUPABASE_URL".to_string()).into());
        }
        let key = config.api_key.trim();
        if key.is_empty() {
            return Err(ValidationError::MissingField("SUPABASE_KEY".to_string()).into());
        }

        let api_key = HeaderValue::from_str(key).map_err(|e| {
            ValidationError::InvalidInput(format!("Invalid Supabase key format: {}", e))
        })?;
        let auth_header = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
            ValidationError::InvalidInput(format!("Invalid Supabase key format: {}", e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            rpc_function: config.rpc_function.clone(),
            assets_table: config.assets_table.clone(),
            api_key,
            auth_header,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("apikey", self.api_key.clone());
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, self.rpc_function)
    }

    fn tickers_url(&self) -> String {
        format!("{}/rest/v1/{}?select=ticker", self.base_url, self.assets_table)
    }

    /// Upsert the batch through the RPC function.
    ///
    /// Returns the number of rows sent. An empty batch makes no request.
    pub async fn bulk_upsert_assets(&self, snapshots: &[AssetSnapshot]) -> Result<usize> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let url = self.rpc_url();
        info!(
            "[Supabase] Sending {} records via RPC '{}'",
            snapshots.len(),
            self.rpc_function
        );

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&BulkUpsertRequest::new(snapshots))
            .send()
            .await
            .map_err(|e| Error::Sink(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Sink(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Sink(error_message(status, &body)));
        }

        debug!("[Supabase] RPC '{}' accepted the batch", self.rpc_function);
        Ok(snapshots.len())
    }

    /// Tickers already stored in the hosted table, first occurrence first.
    pub async fn list_known_tickers(&self) -> Result<Vec<String>> {
        let url = self.tickers_url();
        debug!("[Supabase] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| Error::Unexpected(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Unexpected(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Unexpected(error_message(status, &body)));
        }

        let rows: Vec<TickerRow> = serde_json::from_str(&body).map_err(|e| {
            Error::Unexpected(format!("Failed to parse response: {} - {}", e, body))
        })?;
        Ok(distinct_tickers(rows))
    }
}

/// Best message for a failed call: the PostgREST `message`, with its error
/// code and hint when present, else the status and the start of the body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = err.message {
            let mut text = match err.code {
                Some(code) => format!("API error ({}): {}", code, message),
                None => format!("API error: {}", message),
            };
            if let Some(hint) = err.hint {
                text.push_str(&format!(" (hint: {})", hint));
            }
            return text;
        }
    }
    format!(
        "API error {}: {}",
        status,
        body.chars().take(200).collect::<String>()
    )
}

fn distinct_tickers(rows: Vec<TickerRow>) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .map(|row| row.ticker)
        .filter(|ticker| seen.insert(ticker.clone()))
        .collect()
}

#[async_trait]
impl SnapshotSink for SupabaseClient {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn upsert_snapshots(&self, snapshots: &[AssetSnapshot]) -> Result<usize> {
        self.bulk_upsert_assets(snapshots).await
    }
}

#[async_trait]
impl IdentifierSource for SupabaseClient {
    async fn known_identifiers(&self) -> Result<Vec<String>> {
        self.list_known_tickers().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn config() -> SupabaseConfig {
        SupabaseConfig::new("https://project.supabase.co/", "anon-key")
    }

    #[test]
    fn test_client_creation() {
        let client = SupabaseClient::new(&config()).unwrap();
        let headers = client.headers();
        assert_eq!(headers.get("apikey").unwrap(), "anon-key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer anon-key");
    }

    #[test]
    fn test_client_url_normalization() {
        let client = SupabaseClient::new(&config()).unwrap();
        assert_eq!(
            client.rpc_url(),
            "https://project.supabase.co/rest/v1/rpc/bulk_upsert_assets"
        );
        assert_eq!(
            client.tickers_url(),
            "https://project.supabase.co/rest/v1/financial_assets?select=ticker"
        );
    }

    #[test]
    fn test_custom_function_and_table() {
        let mut config = config();
        config.rpc_function = "upsert_assets_v2".to_string();
        config.assets_table = "assets".to_string();
        let client = SupabaseClient::new(&config).unwrap();
        assert!(client.rpc_url().ends_with("/rpc/upsert_assets_v2"));
        assert!(client.tickers_url().ends_with("/assets?select=ticker"));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = SupabaseClient::new(&SupabaseConfig::new("", "key")).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(ref f)) if f == "SUPABASE_URL"
        ));

        let err = SupabaseClient::new(&SupabaseConfig::new("https://x.supabase.co", "  "))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(ref f)) if f == "SUPABASE_KEY"
        ));
    }

    #[test]
    fn test_error_message_prefers_postgrest_message() {
        let body = r#"{"code":"42883","message":"function bulk_upsert_assets does not exist","details":null,"hint":null}"#;
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, body),
            "API error (42883): function bulk_upsert_assets does not exist"
        );

        let bare = r#"{"message":"permission denied for function"}"#;
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, bare),
            "API error: permission denied for function"
        );
    }

    #[test]
    fn test_error_message_includes_hint() {
        let body = r#"{"code":"PGRST202","message":"Could not find the function public.bulk_upsert_assets(assets)","details":"Searched for the function","hint":"Perhaps you meant to call public.bulk_upsert_asset"}"#;
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, body),
            "API error (PGRST202): Could not find the function public.bulk_upsert_assets(assets) (hint: Perhaps you meant to call public.bulk_upsert_asset)"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        let msg = error_message(StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert_eq!(msg, "API error 502 Bad Gateway: upstream unavailable");
    }

    #[test]
    fn test_distinct_tickers_keeps_first_occurrence() {
        let rows: Vec<TickerRow> = serde_json::from_str(
            r#"[{"ticker":"VALE3.SA"},{"ticker":"PETR4.SA"},{"ticker":"VALE3.SA"}]"#,
        )
        .unwrap();
        assert_eq!(distinct_tickers(rows), vec!["VALE3.SA", "PETR4.SA"]);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        // Unroutable host: any request would fail.
        let client =
            SupabaseClient::new(&SupabaseConfig::new("http://127.0.0.1:9", "key")).unwrap();
        assert_eq!(client.bulk_upsert_assets(&[]).await.unwrap(), 0);

        let sink: &dyn SnapshotSink = &client;
        assert_eq!(sink.name(), "supabase");
    }
}
