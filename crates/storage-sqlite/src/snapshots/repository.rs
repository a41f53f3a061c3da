use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::FinancialAssetDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::financial_assets::dsl as assets_dsl;
use crate::utils::chunk_for_sqlite;
use assetsnap_core::snapshots::{AssetSnapshot, IdentifierSource, SnapshotSink};
use assetsnap_core::Result;

// Bound values per `financial_assets` row.
const ASSET_COLUMNS: usize = 10;

/// Local store of the latest snapshot per ticker.
pub struct AssetSnapshotRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AssetSnapshotRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Replace the stored rows for every ticker in the batch.
    ///
    /// The whole batch runs in one transaction; rows for other tickers are
    /// never touched.
    pub async fn upsert_snapshots(&self, snapshots: &[AssetSnapshot]) -> Result<usize> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let db_rows = snapshots
            .iter()
            .map(FinancialAssetDB::from_snapshot)
            .collect::<std::result::Result<Vec<_>, StorageError>>()?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut total_upserted = 0;
                for chunk in chunk_for_sqlite(&db_rows, ASSET_COLUMNS) {
                    total_upserted += diesel::replace_into(assets_dsl::financial_assets)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::QueryFailed)?;
                }
                debug!("Upserted {} financial asset rows", total_upserted);
                Ok(total_upserted)
            })
            .await
    }

    /// Latest stored snapshot for a ticker.
    pub fn get_snapshot(&self, ticker: &str) -> Result<Option<AssetSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let row = assets_dsl::financial_assets
            .find(ticker)
            .select(FinancialAssetDB::as_select())
            .first::<FinancialAssetDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(row.map(AssetSnapshot::try_from).transpose()?)
    }

    /// Every stored ticker, alphabetically.
    pub fn list_tickers(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;

        assets_dsl::financial_assets
            .select(assets_dsl::ticker)
            .distinct()
            .order(assets_dsl::ticker.asc())
            .load::<String>(&mut conn)
            .into_core()
    }
}

#[async_trait]
impl SnapshotSink for AssetSnapshotRepository {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn upsert_snapshots(&self, snapshots: &[AssetSnapshot]) -> Result<usize> {
        AssetSnapshotRepository::upsert_snapshots(self, snapshots).await
    }
}

#[async_trait]
impl IdentifierSource for AssetSnapshotRepository {
    async fn known_identifiers(&self) -> Result<Vec<String>> {
        self.list_tickers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use assetsnap_core::snapshots::{DividendPoint, PricePoint};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    /// Creates a test repository backed by a throwaway database.
    /// Returns the temp dir too, to keep it alive.
    async fn create_test_repository() -> (AssetSnapshotRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("assets.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        init(&db_path_str).expect("Failed to init database");
        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (AssetSnapshotRepository::new(pool, writer), temp_dir)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(ticker: &str, price: rust_decimal::Decimal) -> AssetSnapshot {
        let dividend = DividendPoint {
            date: date(2024, 3, 1),
            amount: 0.543211,
        };
        AssetSnapshot {
            ticker: ticker.to_string(),
            name: format!("{} S.A.", ticker),
            sector: "Energy".to_string(),
            current_price: price,
            dividends_12m: dec!(2.00),
            price_history: vec![
                PricePoint {
                    date: date(2024, 4, 1),
                    close: 37.1,
                },
                PricePoint {
                    date: date(2024, 5, 1),
                    close: 38.42,
                },
            ],
            dividend_history: vec![dividend],
            currency: Some("BRL".to_string()),
            last_dividend: Some(dividend),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_read_back() {
        let (repo, _dir) = create_test_repository().await;
        let original = snapshot("PETR4.SA", dec!(38.42));

        let written = repo.upsert_snapshots(&[original.clone()]).await.unwrap();
        assert_eq!(written, 1);

        let stored = repo.get_snapshot("PETR4.SA").unwrap().unwrap();
        assert_eq!(stored, original);
        assert!(repo.get_snapshot("VALE3.SA").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_ticker_only() {
        let (repo, _dir) = create_test_repository().await;
        let batch = [snapshot("PETR4.SA", dec!(38.42)), snapshot("VALE3.SA", dec!(61.87))];
        repo.upsert_snapshots(&batch).await.unwrap();

        repo.upsert_snapshots(&[snapshot("PETR4.SA", dec!(39.01))])
            .await
            .unwrap();

        let petr = repo.get_snapshot("PETR4.SA").unwrap().unwrap();
        let vale = repo.get_snapshot("VALE3.SA").unwrap().unwrap();
        assert_eq!(petr.current_price, dec!(39.01));
        assert_eq!(vale.current_price, dec!(61.87));
        assert_eq!(repo.list_tickers().unwrap(), vec!["PETR4.SA", "VALE3.SA"]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let (repo, _dir) = create_test_repository().await;
        assert_eq!(repo.upsert_snapshots(&[]).await.unwrap(), 0);
        assert!(repo.list_tickers().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_known_identifiers_and_sink_name() {
        let (repo, _dir) = create_test_repository().await;
        let batch = [snapshot("WEGE3.SA", dec!(40.00)), snapshot("ITSA4.SA", dec!(10.12))];
        repo.upsert_snapshots(&batch).await.unwrap();

        let source: &dyn IdentifierSource = &repo;
        assert_eq!(
            source.known_identifiers().await.unwrap(),
            vec!["ITSA4.SA", "WEGE3.SA"]
        );

        let sink: &dyn SnapshotSink = &repo;
        assert_eq!(sink.name(), "sqlite");
    }
}
