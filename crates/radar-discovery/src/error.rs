//! Error types for discovery backends.

use thiserror::Error;

/// Transport-level failures of a discovery call.
///
/// "No results" is never an error; backends return an empty list instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("{backend} request failed: {source}")]
    Http {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("{backend} returned HTTP {status}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("{backend} response could not be decoded: {reason}")]
    Decode {
        backend: &'static str,
        reason: String,
    },

    /// The client could not be constructed.
    #[error("{backend} client misconfigured: {reason}")]
    Config {
        backend: &'static str,
        reason: String,
    },
}

/// Convenience result alias.
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;
