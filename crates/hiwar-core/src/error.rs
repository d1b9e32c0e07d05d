//! Error types shared across the HiwarBot crates

use thiserror::Error;

/// Result alias used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the conversation core and its collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// Query rejected before any collaborator was called
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vector index unreachable or unreadable
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// Language model backend failure, quota, or malformed response
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether a single bounded retry is worthwhile for this failure.
    /// Only connectivity-level failures qualify; a rejected request or a
    /// malformed response will not improve on a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(Error::Network("reset".to_string()).is_transient());
        assert!(Error::Timeout("60s".to_string()).is_transient());
        assert!(!Error::Generation("quota".to_string()).is_transient());
        assert!(!Error::InvalidInput("empty".to_string()).is_transient());
    }
}
