//! Assetsnap Core - Domain entities, services, and traits.
//!
//! This crate turns raw provider data into normalized asset snapshots.
//! It is storage-agnostic and defines the traits that the `storage-sqlite`
//! and `connect` crates implement.

pub mod constants;
pub mod errors;
pub mod snapshots;

// Re-export the snapshot domain
pub use snapshots::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
