use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::models::Quote;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct ResponseStatus {
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Only the `status` block, for reading error bodies whose `data` is absent
/// or shaped differently.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusEnvelope {
    #[serde(default)]
    pub status: ResponseStatus,
}

#[derive(Debug, Deserialize)]
pub struct QuotesLatestResponse {
    #[serde(default)]
    pub status: ResponseStatus,
    #[serde(default)]
    pub data: HashMap<String, CoinEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CoinEntry {
    #[serde(default)]
    pub quote: HashMap<String, FiatQuote>,
}

#[derive(Debug, Deserialize)]
pub struct FiatQuote {
    pub price: Option<f64>,
    pub volume_24h: Option<f64>,
    pub percent_change_24h: Option<f64>,
}

impl QuotesLatestResponse {
    /// Builds quotes in the order of `symbols`, skipping any symbol the
    /// response does not carry.
    pub fn into_quotes(
        self,
        symbols: &[String],
        convert: &str,
        observed_at: DateTime<Utc>,
    ) -> Vec<Quote> {
        let mut data = self.data;
        symbols
            .iter()
            .filter_map(|symbol| {
                data.remove(symbol)?
                    .to_quote(symbol, convert, observed_at)
            })
            .collect()
    }
}

impl CoinEntry {
    pub fn to_quote(
        &self,
        symbol: &str,
        convert: &str,
        observed_at: DateTime<Utc>,
    ) -> Option<Quote> {
        let Some(fiat) = self.quote.get(convert) else {
            warn!(symbol, convert, "No {} quote for {}, skipping", convert, symbol);
            return None;
        };

        let (Some(price), Some(volume_24h), Some(percent_change_24h)) =
            (fiat.price, fiat.volume_24h, fiat.percent_change_24h)
        else {
            warn!(symbol, "Incomplete quote for {}, skipping", symbol);
            return None;
        };

        let quote = Quote::new(symbol, price, volume_24h, percent_change_24h, observed_at);
        if !quote.is_valid() {
            warn!(symbol, "Non-finite quote for {}, skipping", symbol);
            return None;
        }
        Some(quote)
    }
}
