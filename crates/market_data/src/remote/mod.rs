pub mod cmc_client;
pub mod quotes_response;

pub use cmc_client::{API_KEY_HEADER, CONVERT_CURRENCY, CoinMarketCapClient};
pub use quotes_response::{CoinEntry, FiatQuote, QuotesLatestResponse, ResponseStatus};
