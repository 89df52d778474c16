//! Candidates flowing through a run: raw hits in, scored candidates out.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use radar_state::{Backend, HistoryRecord, ScoreCard, SubScores};
use serde::{Deserialize, Serialize};

/// Owner assigned to cross-repo hits that name no requested repo.
pub const CROSS_REPO: &str = "cross-repo";

/// A discovery hit as returned by a backend, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub backend: Backend,
}

impl RawHit {
    pub fn new(title: &str, url: &str, snippet: &str, backend: Backend) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            snippet: snippet.to_string(),
            backend,
        }
    }
}

/// A scored discovery hit.
///
/// Created by the scorer and never mutated afterwards; the fallback penalty
/// is already folded into `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Normalized url.
    pub url: String,
    pub title: String,
    pub repo: String,
    pub backend: Backend,
    pub domain: String,
    pub snippet: String,
    pub scores: SubScores,
    pub total: u32,
    pub tags: Vec<String>,
}

impl ScoredCandidate {
    pub fn is_novel(&self) -> bool {
        self.scores.novelty == 5
    }

    /// History entry recording this candidate as selected at `ts`.
    pub fn to_history_record(&self, ts: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord {
            ts,
            repo: self.repo.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
            backend: self.backend,
            scores: ScoreCard {
                sub: self.scores,
                total: self.total,
            },
            tags: self.tags.clone(),
        }
    }
}

/// Final selection for a run, ordered by descending total (ties by url).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub items: Vec<ScoredCandidate>,
}

impl SelectionResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredCandidate> {
        self.items.iter()
    }

    /// Distinct repos with at least one selected item.
    pub fn repos_represented(&self) -> BTreeSet<&str> {
        self.items.iter().map(|c| c.repo.as_str()).collect()
    }

    /// Selected items for `repo`, in selection order.
    pub fn for_repo<'a>(&'a self, repo: &'a str) -> impl Iterator<Item = &'a ScoredCandidate> {
        self.items.iter().filter(move |c| c.repo == repo)
    }

    pub fn history_records(&self, ts: DateTime<Utc>) -> Vec<HistoryRecord> {
        self.items.iter().map(|c| c.to_history_record(ts)).collect()
    }
}
