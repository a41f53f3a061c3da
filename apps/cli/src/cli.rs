//! Command-line arguments.
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `TICKERS...` | | Exchange-qualified tickers to process |
//! | `--start` | | Window start (`YYYY-MM-DD`) |
//! | `--end` | today | Window end (`YYYY-MM-DD`) |
//! | `--sink` | `supabase` | Where accepted snapshots go |
//! | `--db-path` | `ASSETSNAP_DB_PATH` | SQLite file for `--sink sqlite` |
//! | `--discover` | `false` | Ask the sink for known tickers when none are given |
//! | `--pretty` | `false` | Pretty-print the JSON output |
//!
//! ```bash
//! # Default tickers, persisted to the hosted database
//! assetsnap
//!
//! # Two tickers over an explicit window, kept local
//! assetsnap PETR4.SA VALE3.SA --start 2023-01-01 --end 2024-06-30 --sink sqlite
//! ```

use clap::{Parser, ValueEnum};

/// Build normalized price and dividend snapshots for a list of tickers.
#[derive(Debug, Parser)]
#[command(name = "assetsnap", version, about)]
pub struct Cli {
    /// Exchange-qualified tickers (e.g. PETR4.SA). Defaults apply when empty.
    pub tickers: Vec<String>,

    /// Start of the window; also bounds the dividend and price history.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<String>,

    /// End of the window; trailing dividends are summed up to this day.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<String>,

    /// Destination for accepted snapshots.
    #[arg(long, value_enum, default_value_t = SinkKind::Supabase)]
    pub sink: SinkKind,

    /// SQLite database file, overriding ASSETSNAP_DB_PATH.
    #[arg(long)]
    pub db_path: Option<String>,

    /// When no tickers are given, use the ones the sink already stores.
    #[arg(long)]
    pub discover: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Hosted database through its bulk upsert function.
    Supabase,
    /// Local SQLite file.
    Sqlite,
    /// Print only.
    #[value(name = "none")]
    Off,
}
