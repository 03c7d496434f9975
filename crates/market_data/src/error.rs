use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The API answered with a non-success status.
    #[error("remote error: {message}")]
    Remote { message: String },
    /// The request never produced a usable body.
    #[error("transport error: {cause}")]
    Transport { cause: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            cause: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport {
            cause: format!("malformed response body: {}", err),
        }
    }
}
