//! Persistence sinks and identifier sources.
//!
//! These traits abstract the collaborators around the builder, allowing the
//! local SQLite store and the hosted database to be used interchangeably.

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::HashSet;

use super::model::AssetSnapshot;
use crate::constants::DEFAULT_TICKERS;
use crate::errors::Result;

/// Destination for a batch of snapshots.
///
/// Implementations must insert-or-update keyed by `ticker` and must not
/// touch unrelated keys when the batch fails.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Short name used in logs and run summaries.
    fn name(&self) -> &'static str;

    /// Upsert the batch. Returns the number of records written.
    async fn upsert_snapshots(&self, snapshots: &[AssetSnapshot]) -> Result<usize>;
}

/// Supplier of previously known tickers.
#[async_trait]
pub trait IdentifierSource: Send + Sync {
    /// Distinct tickers, in the order the source reports them.
    async fn known_identifiers(&self) -> Result<Vec<String>>;
}

/// Trim, drop blanks and de-duplicate, keeping first occurrences.
pub fn clean_identifiers<I, S>(identifiers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    identifiers
        .into_iter()
        .filter_map(|id| {
            let id = id.as_ref().trim();
            if id.is_empty() || !seen.insert(id.to_string()) {
                None
            } else {
                Some(id.to_string())
            }
        })
        .collect()
}

/// Pick the tickers for a run.
///
/// The explicit list wins when it has any entry. Otherwise the source is
/// asked; a failing source counts as an empty one. When both come up empty
/// the default list is used.
pub async fn resolve_identifiers(
    explicit: &[String],
    source: Option<&dyn IdentifierSource>,
) -> Vec<String> {
    let explicit = clean_identifiers(explicit);
    if !explicit.is_empty() {
        return explicit;
    }

    if let Some(source) = source {
        match source.known_identifiers().await {
            Ok(known) => {
                let known = clean_identifiers(known);
                if !known.is_empty() {
                    debug!("Using {} identifiers from source", known.len());
                    return known;
                }
            }
            Err(e) => warn!("Identifier source failed, falling back to defaults: {}", e),
        }
    }

    debug!("No identifiers supplied, using default list");
    clean_identifiers(DEFAULT_TICKERS)
}
