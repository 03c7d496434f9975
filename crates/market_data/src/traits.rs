use async_trait::async_trait;
use common::models::Quote;

use crate::error::FetchError;

/// A source of latest quotes for a batch of symbols.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches one quote per requested symbol present upstream, in request
    /// order. Missing symbols are left out rather than reported.
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<Quote>, FetchError>;
}
