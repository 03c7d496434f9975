pub mod error;
pub mod remote;
pub mod traits;

pub use error::FetchError;
pub use remote::CoinMarketCapClient;
pub use traits::QuoteProvider;

#[cfg(any(test, feature = "mock"))]
pub use traits::MockQuoteProvider;
