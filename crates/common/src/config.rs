//! Process configuration, read once from the environment at startup.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://sandbox-api.coinmarketcap.com/v1";
pub const DEFAULT_SYMBOLS: &[&str] = &["BTC", "ETH", "SOL"];
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_LOOKBACK_PERIODS: usize = 24;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("SYMBOLS must name at least one ticker")]
    NoSymbols,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub database_url: String,
    pub base_url: String,
    pub symbols: Vec<String>,
    pub poll_interval: Duration,
    pub retry_interval: Duration,
    /// Reserved; the classifier does not aggregate over past quotes.
    pub lookback_periods: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let symbols = match lookup("SYMBOLS") {
            Some(raw) => parse_symbols(&raw)?,
            None => {
                debug!("SYMBOLS not set, using {:?}", DEFAULT_SYMBOLS);
                DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
            }
        };

        let base_url = match lookup("CMC_BASE_URL") {
            Some(raw) => {
                let url = raw.trim().trim_end_matches('/');
                if url.is_empty() {
                    return Err(ConfigError::Invalid {
                        key: "CMC_BASE_URL",
                        value: raw,
                    });
                }
                url.to_string()
            }
            None => {
                debug!("CMC_BASE_URL not set, using {}", DEFAULT_BASE_URL);
                DEFAULT_BASE_URL.to_string()
            }
        };

        Ok(Self {
            api_key: required("CMC_API_KEY")?,
            database_url: required("DATABASE_URL")?,
            base_url,
            symbols,
            poll_interval: Duration::from_secs(parse_positive(
                &lookup,
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            retry_interval: Duration::from_secs(parse_positive(
                &lookup,
                "RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )?),
            lookback_periods: parse_positive(
                &lookup,
                "LOOKBACK_PERIODS",
                DEFAULT_LOOKBACK_PERIODS as u64,
            )? as usize,
        })
    }
}

/// Splits a comma separated ticker list, upper-casing and dropping repeats.
pub fn parse_symbols(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut symbols: Vec<String> = Vec::new();
    for ticker in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let ticker = ticker.to_uppercase();
        if !symbols.contains(&ticker) {
            symbols.push(ticker);
        }
    }

    if symbols.is_empty() {
        return Err(ConfigError::NoSymbols);
    }
    Ok(symbols)
}

fn parse_positive<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => {
            debug!("{} not set, using {}", key, default);
            Ok(default)
        }
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
    }
}
