use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assetsnap_connect::SupabaseClient;
use assetsnap_core::snapshots::{
    clean_identifiers, parse_iso_date, resolve_identifiers, AssetSnapshot, IdentifierSource,
    RunReport, SnapshotBuilder, SnapshotService, SnapshotSettings, SnapshotSink, SnapshotWindow,
};
use assetsnap_market_data::{MarketDataProvider, YahooProvider};
use assetsnap_storage_sqlite::AssetSnapshotRepository;

use crate::cli::{Cli, SinkKind};
use crate::config::{Config, LogFormat};
use crate::error::CliError;

/// Logs go to stderr so stdout carries only the JSON result.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Window from the command line. A lone `--start` runs up to today.
pub fn parse_window(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<SnapshotWindow>, CliError> {
    match (start, end) {
        (None, None) => Ok(None),
        (start, Some(end)) => Ok(Some(SnapshotWindow::parse(start, end)?)),
        (Some(start), None) => {
            let start = parse_iso_date(start)?;
            let today = Local::now().date_naive();
            Ok(Some(SnapshotWindow::new(Some(start), today)?))
        }
    }
}

/// Where a run sends its snapshots and, with `--discover`, reads known tickers.
pub struct Targets {
    pub sink: Option<Arc<dyn SnapshotSink>>,
    pub source: Option<Arc<dyn IdentifierSource>>,
}

/// Open the selected sink.
///
/// Fails before any network or disk activity when the hosted database is
/// selected without credentials.
pub fn build_targets(cli: &Cli, config: &Config) -> Result<Targets, CliError> {
    match cli.sink {
        SinkKind::Supabase => {
            let client = Arc::new(SupabaseClient::new(&config.supabase()?)?);
            let sink: Arc<dyn SnapshotSink> = client.clone();
            let source: Arc<dyn IdentifierSource> = client;
            Ok(Targets {
                sink: Some(sink),
                source: Some(source),
            })
        }
        SinkKind::Sqlite => {
            let db_path = cli.db_path.as_deref().unwrap_or(&config.db_path);
            let (pool, writer) = assetsnap_storage_sqlite::open(db_path)?;
            info!("Database path in use: {}", db_path);
            let repository = Arc::new(AssetSnapshotRepository::new(pool, writer));
            let sink: Arc<dyn SnapshotSink> = repository.clone();
            let source: Arc<dyn IdentifierSource> = repository;
            Ok(Targets {
                sink: Some(sink),
                source: Some(source),
            })
        }
        SinkKind::Off => Ok(Targets {
            sink: None,
            source: None,
        }),
    }
}

/// Resolve the tickers, build every snapshot and hand the batch to the sink.
pub async fn execute(
    cli: &Cli,
    window: Option<SnapshotWindow>,
    targets: Targets,
    provider: Arc<dyn MarketDataProvider>,
) -> RunReport {
    let explicit = clean_identifiers(&cli.tickers);
    let source = if cli.discover {
        if targets.source.is_none() {
            warn!("--discover needs a sink to read tickers from; using defaults");
        }
        targets.source.as_deref()
    } else {
        None
    };

    let identifiers = resolve_identifiers(&explicit, source).await;
    info!("Processing {} tickers", identifiers.len());

    let builder = SnapshotBuilder::new(provider, SnapshotSettings::default());
    let service = SnapshotService::new(builder, targets.sink.clone());
    let report = service.run(identifiers, window).await;

    if report.is_empty() {
        warn!("No asset data was obtained. Check the requested tickers.");
    }
    info!("{}", report.summary());
    report
}

pub fn render_snapshots<W: Write>(
    mut out: W,
    snapshots: &[AssetSnapshot],
    pretty: bool,
) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut out, snapshots)?;
    } else {
        serde_json::to_writer(&mut out, snapshots)?;
    }
    writeln!(out)?;
    Ok(())
}

pub async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    let window = parse_window(cli.start.as_deref(), cli.end.as_deref())?;
    let targets = build_targets(&cli, &config)?;
    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooProvider::new()?);

    let report = execute(&cli, window, targets, provider).await;
    render_snapshots(std::io::stdout().lock(), &report.snapshots, cli.pretty)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetsnap_market_data::{DividendEvent, Interval, MarketDataError, PriceBar, QuoteSummary};
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, Utc};
    use clap::Parser;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct MockProvider {
        summary_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        fn id(&self) -> &'static str {
            "MOCK"
        }

        async fn get_quote_summary(&self, symbol: &str) -> Result<QuoteSummary, MarketDataError> {
            self.summary_calls.lock().unwrap().push(symbol.to_string());
            if symbol == "PETR4.SA" {
                Ok(QuoteSummary::new(symbol)
                    .long_name("Petróleo Brasileiro S.A.")
                    .sector("Energy")
                    .regular_market_price(38.416))
            } else {
                Err(MarketDataError::SymbolNotFound(symbol.to_string()))
            }
        }

        async fn get_dividends(&self, _symbol: &str) -> Result<Vec<DividendEvent>, MarketDataError> {
            Ok(Vec::new())
        }

        async fn get_price_history(
            &self,
            _symbol: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _interval: Interval,
        ) -> Result<Vec<PriceBar>, MarketDataError> {
            Ok(Vec::new())
        }
    }

    fn sqlite_config(path: &str) -> Config {
        let path = path.to_string();
        Config::from_lookup(move |key| (key == "ASSETSNAP_DB_PATH").then(|| path.clone()))
    }

    #[test]
    fn test_parse_window() {
        assert!(parse_window(None, None).unwrap().is_none());

        let window = parse_window(Some("2023-01-01"), Some("2024-06-30"))
            .unwrap()
            .unwrap();
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());

        let open_start = parse_window(None, Some("2024-06-30")).unwrap().unwrap();
        assert!(open_start.start.is_none());

        let until_today = parse_window(Some("2023-01-01"), None).unwrap().unwrap();
        assert_eq!(until_today.end, Local::now().date_naive());
    }

    #[test]
    fn test_parse_window_rejects_bad_input() {
        let err = parse_window(None, Some("30/06/2024")).unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(assetsnap_core::errors::Error::Validation(_))
        ));
        assert_eq!(err.exit_code(), 2);

        let err = parse_window(Some("2024-07-01"), Some("2024-06-30")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_supabase_without_credentials_fails_preflight() {
        let cli = Cli::try_parse_from(["assetsnap"]).unwrap();
        let config = Config::from_lookup(|_| None);
        let err = build_targets(&cli, &config).err().unwrap();
        assert!(matches!(err, CliError::MissingCredential("SUPABASE_URL")));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_render_empty_and_pretty() {
        let mut out = Vec::new();
        render_snapshots(&mut out, &[], false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");

        let snapshot = AssetSnapshot {
            ticker: "ITSA4.SA".to_string(),
            name: "Itaúsa".to_string(),
            sector: "unknown".to_string(),
            current_price: "10.12".parse().unwrap(),
            dividends_12m: "0.00".parse().unwrap(),
            price_history: Vec::new(),
            dividend_history: Vec::new(),
            currency: None,
            last_dividend: None,
        };
        let mut out = Vec::new();
        render_snapshots(&mut out, &[snapshot], true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.contains("\"ticker\": \"ITSA4.SA\""));
    }

    #[tokio::test]
    async fn test_execute_persists_accepted_snapshots_to_sqlite() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("db").join("assets.db");
        let db_path = db_path.to_string_lossy().to_string();
        let config = sqlite_config(&db_path);

        let cli =
            Cli::try_parse_from(["assetsnap", "PETR4.SA", "INVALID", "--sink", "sqlite"]).unwrap();
        let targets = build_targets(&cli, &config).unwrap();
        let provider = Arc::new(MockProvider::default());

        let report = execute(&cli, None, targets, provider.clone()).await;
        assert_eq!(report.snapshots.len(), 1);
        assert_eq!(report.snapshots[0].ticker, "PETR4.SA");
        assert_eq!(report.snapshots[0].current_price.to_string(), "38.42");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.persisted, Some(1));

        // Second run discovers the stored ticker instead of the defaults.
        let cli = Cli::try_parse_from(["assetsnap", "--sink", "sqlite", "--discover"]).unwrap();
        let targets = build_targets(&cli, &config).unwrap();
        let provider = Arc::new(MockProvider::default());
        let report = execute(&cli, None, targets, provider.clone()).await;

        assert_eq!(
            *provider.summary_calls.lock().unwrap(),
            vec!["PETR4.SA".to_string()]
        );
        assert_eq!(report.snapshots.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_without_tickers_uses_defaults() {
        let cli = Cli::try_parse_from(["assetsnap", "--sink", "none", "--discover"]).unwrap();
        let targets = build_targets(&cli, &Config::from_lookup(|_| None)).unwrap();
        let provider = Arc::new(MockProvider::default());

        let report = execute(&cli, None, targets, provider.clone()).await;

        let calls = provider.summary_calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            assetsnap_core::constants::DEFAULT_TICKERS
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
        );
        assert_eq!(report.snapshots.len(), 1);
        assert!(report.persisted.is_none());
    }
}
