//! Seen index: normalized URLs selected by any prior run.

use std::collections::HashSet;

use radar_state::{HistoryRecord, HistoryStore, StateResult};

use crate::url::normalize_url;

/// Set of previously selected normalized URLs. Built once at run start and
/// never mutated during the run.
#[derive(Debug, Clone, Default)]
pub struct SeenIndex {
    urls: HashSet<String>,
}

impl SeenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a HistoryRecord>) -> Self {
        Self::from_urls(records.into_iter().map(|r| r.url.as_str()))
    }

    pub fn from_urls<'a>(urls: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            urls: urls
                .into_iter()
                .filter(|u| !u.is_empty())
                .map(normalize_url)
                .collect(),
        }
    }

    /// Build from the most recent `window` records of `store`.
    pub fn load(store: &dyn HistoryStore, window: usize) -> StateResult<Self> {
        let records = store.read_recent(window)?;
        Ok(Self::from_records(&records))
    }

    /// Whether `normalized_url` was selected before.
    pub fn contains(&self, normalized_url: &str) -> bool {
        self.urls.contains(normalized_url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
