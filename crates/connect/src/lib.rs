//! Assetsnap Connect - hosted database sink.
//!
//! This crate pushes snapshot batches to a Supabase project through its
//! PostgREST API and reads back the tickers already stored there.

pub mod client;
pub mod models;

// Re-export commonly used types
pub use client::{SupabaseClient, SupabaseConfig, DEFAULT_ASSETS_TABLE, DEFAULT_RPC_FUNCTION};
pub use models::{AssetRow, BulkUpsertRequest};
