//! Radar-State: policy and history persistence for the repo radar
//!
//! ## Key Components
//!
//! - `Policy`: versioned scoring/selection configuration, created with
//!   defaults on first use
//! - `HistoryRecord`: one selected item from one run, stored append-only
//! - `StateDir`: filesystem layout (`policy.json`, `history.jsonl`)

mod error;
pub mod fakes;
pub mod fs;
mod schema;
pub mod storage_traits;

pub use error::StateError;
pub use fs::{FsPolicyStore, JsonlHistoryStore, StateDir};
pub use schema::{
    Backend, HistoryRecord, Limits, Policy, QueryTemplates, ScoreCard, SubScores, TrackedRepo,
    Weights, POLICY_VERSION,
};
pub use storage_traits::{HistoryStore, PolicyStore, StateResult};
