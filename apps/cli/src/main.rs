mod cli;
mod config;
mod error;
mod main_lib;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::config::Config;
use crate::main_lib::{init_tracing, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(config.log_format);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{}", error);
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}
