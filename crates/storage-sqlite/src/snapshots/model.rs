//! Database model for asset snapshots.

use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;
use assetsnap_core::snapshots::{AssetSnapshot, DividendPoint};

/// Database model for the `financial_assets` table.
///
/// Money is stored as decimal text and the histories as JSON text, so a row
/// reads back into exactly the snapshot that was written.
#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::financial_assets)]
#[diesel(primary_key(ticker))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FinancialAssetDB {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub current_price: String,
    pub dividends_12m: String,
    pub currency: Option<String>,
    pub last_dividend: Option<String>,
    pub price_history: String,
    pub dividend_history: String,
    pub updated_at: String,
}

impl FinancialAssetDB {
    pub fn from_snapshot(snapshot: &AssetSnapshot) -> Result<Self, StorageError> {
        Ok(Self {
            ticker: snapshot.ticker.clone(),
            name: snapshot.name.clone(),
            sector: snapshot.sector.clone(),
            current_price: snapshot.current_price.to_string(),
            dividends_12m: snapshot.dividends_12m.to_string(),
            currency: snapshot.currency.clone(),
            last_dividend: snapshot
                .last_dividend
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            price_history: serde_json::to_string(&snapshot.price_history)?,
            dividend_history: serde_json::to_string(&snapshot.dividend_history)?,
            updated_at: Utc::now().to_rfc3339(),
        })
    }
}

impl TryFrom<FinancialAssetDB> for AssetSnapshot {
    type Error = StorageError;

    fn try_from(db: FinancialAssetDB) -> Result<Self, Self::Error> {
        let parse_decimal = |field: &str, value: &str| {
            Decimal::from_str(value).map_err(|e| {
                StorageError::SerializationError(format!("{} '{}': {}", field, value, e))
            })
        };

        let last_dividend: Option<DividendPoint> = db
            .last_dividend
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(AssetSnapshot {
            current_price: parse_decimal("current_price", &db.current_price)?,
            dividends_12m: parse_decimal("dividends_12m", &db.dividends_12m)?,
            price_history: serde_json::from_str(&db.price_history)?,
            dividend_history: serde_json::from_str(&db.dividend_history)?,
            ticker: db.ticker,
            name: db.name,
            sector: db.sector,
            currency: db.currency,
            last_dividend,
        })
    }
}
