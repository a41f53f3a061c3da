//! SQLite storage implementation for asset snapshots.

mod model;
mod repository;

pub use model::FinancialAssetDB;
pub use repository::AssetSnapshotRepository;

// Re-export traits from core for convenience
pub use assetsnap_core::snapshots::{IdentifierSource, SnapshotSink};
