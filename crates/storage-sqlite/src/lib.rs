//! SQLite storage for asset snapshots.
//!
//! This crate keeps the latest snapshot of every tracked ticker in a local
//! SQLite file using Diesel. It implements the sink and identifier-source
//! traits defined in `assetsnap-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Embedded Diesel migrations
//! - The `financial_assets` repository
//!
//! # Architecture
//!
//! Diesel only appears in this crate. `core` and `connect` talk to storage
//! through traits.
//!
//! ```text
//! core (snapshots)        cli
//!       │                  │
//!       └────────┬─────────┘
//!                │
//!                ▼
//!        storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod snapshots;
pub mod utils;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, open, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use snapshots::AssetSnapshotRepository;

// Re-export from assetsnap-core for convenience
pub use assetsnap_core::errors::{DatabaseError, Error, Result};
