//! Error types for radar-state

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the state persistence layer
#[derive(Error, Debug)]
pub enum StateError {
    /// Reading or writing a state file failed
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A stored document exists but could not be decoded
    #[error("Deserialization failed for {}: {reason}", path.display())]
    Deserialization { path: PathBuf, reason: String },

    /// Stored policy violates its invariants
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

impl StateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StateError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = StateError::io(
            "/tmp/radar/history.jsonl",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("history.jsonl"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn invalid_policy_display() {
        let err = StateError::InvalidPolicy("weights.novelty is negative".to_string());
        assert!(err.to_string().contains("invalid policy"));
        assert!(err.to_string().contains("weights.novelty"));
    }
}
