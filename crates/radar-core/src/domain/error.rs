//! Domain-level error taxonomy for the radar.
//!
//! Discovery failures and malformed records are recovered where they occur
//! and never reach this type; what does reach it is fatal for the run.

use radar_state::StateError;

/// Radar domain errors.
#[derive(Debug, thiserror::Error)]
pub enum RadarError {
    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("invalid canonical source for {repo}: {identifier:?}")]
    InvalidCanonicalSource { repo: String, identifier: String },
}

/// Result type for radar domain operations.
pub type Result<T> = std::result::Result<T, RadarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_errors_bubble_up() {
        let err: RadarError = StateError::InvalidPolicy("limits.history_window".to_string()).into();
        assert!(err.to_string().contains("state error"));
        assert!(err.to_string().contains("history_window"));
    }

    #[test]
    fn invalid_canonical_source_names_repo() {
        let err = RadarError::InvalidCanonicalSource {
            repo: "moltbot".to_string(),
            identifier: "".to_string(),
        };
        assert!(err.to_string().contains("moltbot"));
    }
}
