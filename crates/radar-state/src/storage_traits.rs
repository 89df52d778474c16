//! Storage trait definitions for the radar
//!
//! - `PolicyStore`: a single structured policy document, created with
//!   defaults on first use
//! - `HistoryStore`: an append-only log of selected items
//!
//! Filesystem implementations live in `fs`; in-memory fakes for tests live
//! in `fakes`.

use crate::error::StateError;
use crate::schema::{HistoryRecord, Policy};

/// Result type for storage operations
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Read/write access to the radar policy.
pub trait PolicyStore: Send + Sync {
    /// Load the stored policy, or `None` if none has been written yet.
    fn load(&self) -> StateResult<Option<Policy>>;

    /// Persist `policy`, replacing any previous document.
    fn save(&self, policy: &Policy) -> StateResult<()>;

    /// Load the stored policy, writing and returning defaults when absent.
    ///
    /// A loaded policy is validated; an invalid document is an error rather
    /// than silently replaced.
    fn load_or_init(&self) -> StateResult<Policy> {
        match self.load()? {
            Some(policy) => {
                policy.validate()?;
                Ok(policy)
            }
            None => {
                let policy = Policy::default();
                self.save(&policy)?;
                tracing::info!(event = "policy.initialized", version = policy.version);
                Ok(policy)
            }
        }
    }
}

/// Append-only history of selected items.
///
/// Guarantees:
/// - `append` never rewrites or removes existing records.
/// - `read_recent(n)` returns at most `n` records, oldest first, drawn from
///   the end of the log.
pub trait HistoryStore: Send + Sync {
    /// Append records in order.
    fn append(&self, records: &[HistoryRecord]) -> StateResult<()>;

    /// Read up to `limit` of the most recent records. Malformed entries are
    /// skipped.
    fn read_recent(&self, limit: usize) -> StateResult<Vec<HistoryRecord>>;
}
