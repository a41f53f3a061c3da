use thiserror::Error;

use assetsnap_core::errors::Error as CoreError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("missing required configuration: {0}")]
    MissingCredential(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    MarketData(#[from] assetsnap_market_data::MarketDataError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingCredential(_) => 2,
            Self::Core(CoreError::Validation(_)) => 2,
            Self::Core(_) => 10,
            Self::MarketData(_) => 10,
            Self::Serialization(_) => 10,
            Self::Io(_) => 10,
        }
    }
}
