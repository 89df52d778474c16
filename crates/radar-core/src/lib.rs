//! Radar Core Library
//!
//! Scoring, guardrails and diversity-constrained selection for the repo radar,
//! plus the orchestrator that drives discovery and the Markdown report.

pub mod domain;
pub mod obs;
pub mod orchestrator;
pub mod report;
pub mod scorer;
pub mod seen;
pub mod selector;
pub mod telemetry;
pub mod url;

pub use domain::{RadarError, RawHit, Result, ScoredCandidate, SelectionResult, CROSS_REPO};

pub use orchestrator::{assign_repo, fallback_query, record_selection, Orchestrator, RunOutcome};

pub use report::{render_report, write_report};

pub use scorer::{
    apply_multiplier, score, validate_canonical_sources, weighted_total, CanonicalSource,
    RejectReason, Rejection, ScoreOutcome,
};

pub use seen::SeenIndex;

pub use selector::{dedupe_by_url, rank, select};

pub use telemetry::init_tracing;

pub use crate::url::{domain_of, normalize_url};

/// Radar version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
