use market_data::FetchError;
use storage::StoreError;
use thiserror::Error;

/// Anything that aborts a single poll cycle. None of these end the loop.
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("store failed: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}
