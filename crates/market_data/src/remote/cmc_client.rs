use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::models::Quote;
use reqwest::{Client, header::ACCEPT};
use tracing::{debug, error};

use crate::{
    error::FetchError,
    remote::quotes_response::{QuotesLatestResponse, StatusEnvelope},
    traits::QuoteProvider,
};

pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
pub const CONVERT_CURRENCY: &str = "USD";

const QUOTES_PATH: &str = "/cryptocurrency/quotes/latest";

#[derive(Clone)]
pub struct CoinMarketCapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoinMarketCapClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("crypto_tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn make_request(&self, symbols: &[String]) -> Result<Vec<Quote>, FetchError> {
        let url = format!("{}{}", self.base_url, QUOTES_PATH);
        let joined = symbols.join(",");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .query(&[("symbol", joined.as_str()), ("convert", CONVERT_CURRENCY)])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let observed_at = Utc::now();

        if !status.is_success() {
            let message = serde_json::from_slice::<StatusEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.status.error_message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(FetchError::Remote { message });
        }

        let parsed: QuotesLatestResponse = serde_json::from_slice(&body)?;
        let quotes = parsed.into_quotes(symbols, CONVERT_CURRENCY, observed_at);

        debug!(
            requested = symbols.len(),
            received = quotes.len(),
            "Received {} of {} quotes",
            quotes.len(),
            symbols.len()
        );
        Ok(quotes)
    }
}

#[async_trait]
impl QuoteProvider for CoinMarketCapClient {
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<Quote>, FetchError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        self.make_request(symbols)
            .await
            .inspect_err(|e| error!("Error fetching data: {}", e))
    }
}
