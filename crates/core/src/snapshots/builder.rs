//! Snapshot builder.
//!
//! Fetches the raw data for one ticker through a [`MarketDataProvider`] and
//! applies the normalization rules. Failures never escape: each ticker ends
//! up as either an [`AssetSnapshot`] or a [`SkipReason`].

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use log::{debug, info, warn};

use assetsnap_market_data::MarketDataProvider;

use super::model::{AssetQuery, AssetSnapshot, SkipReason, SnapshotOutcome, SnapshotWindow};
use super::normalize::{
    dividend_history, monthly_closes, resolve_current_price, resolve_name, resolve_sector,
    trailing_dividend_sum,
};
use super::settings::{SnapshotBounds, SnapshotSettings};

/// Wall-clock reading in UTC, the same frame provider timestamps arrive in.
fn utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Builds snapshots one ticker at a time.
pub struct SnapshotBuilder {
    provider: Arc<dyn MarketDataProvider>,
    settings: SnapshotSettings,
    clock: fn() -> NaiveDateTime,
}

impl SnapshotBuilder {
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: SnapshotSettings) -> Self {
        Self {
            provider,
            settings,
            clock: utc_now,
        }
    }

    /// Replace the source of "now" used when no window is given.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &SnapshotSettings {
        &self.settings
    }

    fn bounds(&self, window: Option<&SnapshotWindow>) -> SnapshotBounds {
        self.settings.bounds(window, (self.clock)())
    }

    /// Build the snapshot for one query.
    pub async fn build_snapshot(&self, query: &AssetQuery) -> SnapshotOutcome {
        let bounds = self.bounds(query.window.as_ref());
        self.build_with_bounds(&query.ticker, &bounds).await
    }

    /// Lazily build snapshots in input order, reporting every ticker.
    ///
    /// Tickers are processed one at a time; nothing is fetched until the
    /// stream is polled. All tickers share the boundaries resolved when the
    /// stream is created.
    pub fn build_outcomes(
        &self,
        identifiers: Vec<String>,
        window: Option<SnapshotWindow>,
    ) -> impl Stream<Item = (String, SnapshotOutcome)> + '_ {
        let bounds = self.bounds(window.as_ref());
        stream::iter(identifiers).then(move |ticker| async move {
            let outcome = self.build_with_bounds(&ticker, &bounds).await;
            (ticker, outcome)
        })
    }

    /// Lazily build snapshots in input order, omitting skipped tickers.
    pub fn build_snapshot_batch(
        &self,
        identifiers: Vec<String>,
        window: Option<SnapshotWindow>,
    ) -> impl Stream<Item = AssetSnapshot> + '_ {
        self.build_outcomes(identifiers, window)
            .filter_map(|(_, outcome)| future::ready(outcome.ok()))
    }

    async fn build_with_bounds(&self, ticker: &str, bounds: &SnapshotBounds) -> SnapshotOutcome {
        debug!("Building snapshot for {} from {}", ticker, self.provider.id());

        match self.collect(ticker, bounds).await {
            Ok(snapshot) => {
                info!(
                    "Built snapshot for {}: price {} dividends_12m {}",
                    ticker, snapshot.current_price, snapshot.dividends_12m
                );
                Ok(snapshot)
            }
            Err(reason) => {
                warn!("Skipping {}: {}", ticker, reason);
                Err(reason)
            }
        }
    }

    async fn collect(
        &self,
        ticker: &str,
        bounds: &SnapshotBounds,
    ) -> Result<AssetSnapshot, SkipReason> {
        let summary = self.provider.get_quote_summary(ticker).await?;

        let current_price = resolve_current_price(&summary).ok_or(SkipReason::NoPrice)?;
        let name = resolve_name(&summary, ticker);
        let sector = resolve_sector(&summary);

        let dividends = self.provider.get_dividends(ticker).await?;
        let dividends_12m =
            trailing_dividend_sum(&dividends, bounds.end, self.settings.dividend_lookback_days);
        let dividend_history =
            dividend_history(&dividends, bounds.dividend_history_start, bounds.end);
        let last_dividend = dividend_history.last().copied();

        let price_history = match self
            .provider
            .get_price_history(
                ticker,
                bounds.price_start_utc(),
                bounds.end_utc(),
                self.settings.price_interval,
            )
            .await
        {
            Ok(bars) => monthly_closes(&bars),
            Err(e) if e.is_empty_result() => {
                debug!("No price history for {} in range", ticker);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(AssetSnapshot {
            ticker: ticker.to_string(),
            name,
            sector,
            current_price,
            dividends_12m,
            price_history,
            dividend_history,
            currency: summary.currency,
            last_dividend,
        })
    }
}
