//! Gotify Client Error Types

use thiserror::Error;

/// Errors raised while setting up a Gotify client
#[derive(Debug, Error)]
pub enum GotifyError {
    /// The underlying HTTP client could not be built
    #[error("HTTP client error: {0}")]
    ClientBuild(String),

    /// The configured URL prefix is unusable
    #[error("Invalid Gotify URL prefix: {0:?}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for GotifyError {
    fn from(err: reqwest::Error) -> Self {
        GotifyError::ClientBuild(err.to_string())
    }
}
