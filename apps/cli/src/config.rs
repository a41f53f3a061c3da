use assetsnap_connect::SupabaseConfig;

use crate::error::CliError;

pub const DEFAULT_DB_PATH: &str = "./db/assets.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub db_path: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let log_format = match var("ASSETSNAP_LOG_FORMAT") {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            supabase_url: var("SUPABASE_URL"),
            supabase_key: var("SUPABASE_KEY"),
            db_path: var("ASSETSNAP_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into()),
            log_format,
        }
    }

    /// Hosted database settings. Both values must be present.
    pub fn supabase(&self) -> Result<SupabaseConfig, CliError> {
        let url = self
            .supabase_url
            .as_deref()
            .ok_or(CliError::MissingCredential("SUPABASE_URL"))?;
        let key = self
            .supabase_key
            .as_deref()
            .ok_or(CliError::MissingCredential("SUPABASE_KEY"))?;
        Ok(SupabaseConfig::new(url, key))
    }
}
