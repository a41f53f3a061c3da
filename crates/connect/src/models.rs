//! Wire types for the hosted `financial_assets` table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use assetsnap_core::snapshots::AssetSnapshot;

/// One row of the hosted table, as the upsert function expects it.
///
/// The hosted table only keeps the headline figures; histories stay local.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRow<'a> {
    pub ticker: &'a str,
    pub name: &'a str,
    pub sector: &'a str,
    pub current_price: Decimal,
    pub dividends_12m: Decimal,
}

impl<'a> From<&'a AssetSnapshot> for AssetRow<'a> {
    fn from(snapshot: &'a AssetSnapshot) -> Self {
        Self {
            ticker: &snapshot.ticker,
            name: &snapshot.name,
            sector: &snapshot.sector,
            current_price: snapshot.current_price,
            dividends_12m: snapshot.dividends_12m,
        }
    }
}

/// Arguments of the bulk upsert RPC.
#[derive(Debug, Serialize)]
pub struct BulkUpsertRequest<'a> {
    pub assets_data: Vec<AssetRow<'a>>,
}

impl<'a> BulkUpsertRequest<'a> {
    pub fn new(snapshots: &'a [AssetSnapshot]) -> Self {
        Self {
            assets_data: snapshots.iter().map(AssetRow::from).collect(),
        }
    }
}

/// Row returned by `select=ticker`.
#[derive(Debug, Deserialize)]
pub(crate) struct TickerRow {
    pub ticker: String,
}

/// PostgREST error body. `details` is not surfaced and is left unparsed.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}
