use thiserror::Error;

pub type Result<T> = std::result::Result<T, DrednotError>;

#[derive(Debug, Error)]
pub enum DrednotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Bridge error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The anonymous login key was rejected during session establishment.
    /// Non-retryable with the same credential; the supervisor must fall back
    /// to guest entry on the next attempt.
    #[error("invalid anonymous login key")]
    InvalidLoginKey,
}

impl From<reqwest::Error> for DrednotError {
    fn from(err: reqwest::Error) -> Self {
        DrednotError::Network(err.to_string())
    }
}
