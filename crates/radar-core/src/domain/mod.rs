//! Domain models for the radar.
//!
//! - `RawHit`: a discovery result tagged with its backend
//! - `ScoredCandidate`: a hit after scoring and guardrails
//! - `SelectionResult`: the bounded, diverse output of a run

pub mod candidate;
pub mod error;

pub use candidate::{RawHit, ScoredCandidate, SelectionResult, CROSS_REPO};
pub use error::{RadarError, Result};
