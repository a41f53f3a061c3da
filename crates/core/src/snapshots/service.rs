//! Run orchestration: build every snapshot, then hand the batch to a sink.

use std::sync::Arc;

use futures::StreamExt;
use log::{error, info, warn};

use super::builder::SnapshotBuilder;
use super::model::{AssetSnapshot, SkipReason, SnapshotWindow};
use super::sink::SnapshotSink;

/// Aggregate result of a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Accepted snapshots, in input order.
    pub snapshots: Vec<AssetSnapshot>,
    /// Tickers that produced no snapshot (ticker, reason).
    pub skipped: Vec<(String, SkipReason)>,
    /// Records written by the sink, when it was called and succeeded.
    pub persisted: Option<usize>,
    /// Sink failure message, when it was called and failed.
    pub sink_error: Option<String>,
}

impl RunReport {
    /// Whether the run accepted no snapshot at all.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Built {} snapshots, skipped {}",
            self.snapshots.len(),
            self.skipped.len()
        );
        if let Some(count) = self.persisted {
            summary.push_str(&format!(", persisted {}", count));
        }
        if let Some(err) = &self.sink_error {
            summary.push_str(&format!(", sink failed: {}", err));
        }
        summary
    }
}

/// Builds a batch and persists it.
pub struct SnapshotService {
    builder: SnapshotBuilder,
    sink: Option<Arc<dyn SnapshotSink>>,
}

impl SnapshotService {
    pub fn new(builder: SnapshotBuilder, sink: Option<Arc<dyn SnapshotSink>>) -> Self {
        Self { builder, sink }
    }

    pub fn builder(&self) -> &SnapshotBuilder {
        &self.builder
    }

    /// Process `identifiers` in order.
    ///
    /// The sink is called at most once, after every ticker has been
    /// processed, and only when at least one snapshot was accepted. A sink
    /// failure is recorded in the report and never retried.
    pub async fn run(&self, identifiers: Vec<String>, window: Option<SnapshotWindow>) -> RunReport {
        let mut report = RunReport::default();

        let outcomes: Vec<_> = self
            .builder
            .build_outcomes(identifiers, window)
            .collect()
            .await;

        for (ticker, outcome) in outcomes {
            match outcome {
                Ok(snapshot) => report.snapshots.push(snapshot),
                Err(reason) => report.skipped.push((ticker, reason)),
            }
        }

        if report.snapshots.is_empty() {
            warn!("No snapshots were built; nothing to persist");
            return report;
        }

        if let Some(sink) = &self.sink {
            info!(
                "Sending {} snapshots to {}",
                report.snapshots.len(),
                sink.name()
            );
            match sink.upsert_snapshots(&report.snapshots).await {
                Ok(count) => {
                    info!("{} accepted {} snapshots", sink.name(), count);
                    report.persisted = Some(count);
                }
                Err(e) => {
                    error!("Failed to persist snapshots to {}: {}", sink.name(), e);
                    report.sink_error = Some(e.to_string());
                }
            }
        }

        report
    }
}
