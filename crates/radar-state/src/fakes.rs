//! In-memory fakes for storage traits (testing only)
//!
//! `MemoryPolicyStore` and `MemoryHistoryStore` satisfy the trait contracts
//! without touching the filesystem.

use std::sync::Mutex;

use crate::schema::{HistoryRecord, Policy};
use crate::storage_traits::{HistoryStore, PolicyStore, StateResult};

/// In-memory policy slot.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    policy: Mutex<Option<Policy>>,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy: Mutex::new(Some(policy)),
        }
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn load(&self) -> StateResult<Option<Policy>> {
        Ok(self.policy.lock().unwrap().clone())
    }

    fn save(&self, policy: &Policy) -> StateResult<()> {
        *self.policy.lock().unwrap() = Some(policy.clone());
        Ok(())
    }
}

/// In-memory history log backed by a `Vec`.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&self, records: &[HistoryRecord]) -> StateResult<()> {
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    fn read_recent(&self, limit: usize) -> StateResult<Vec<HistoryRecord>> {
        let records = self.records.lock().unwrap();
        let start = records.len().saturating_sub(limit);
        Ok(records[start..].to_vec())
    }
}
