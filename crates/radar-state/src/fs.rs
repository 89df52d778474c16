//! Filesystem-backed stores.
//!
//! Layout under the state directory:
//! - `policy.json`: pretty-printed [`Policy`]
//! - `history.jsonl`: one [`HistoryRecord`] per line

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StateError;
use crate::schema::{HistoryRecord, Policy};
use crate::storage_traits::{HistoryStore, PolicyStore, StateResult};

pub const POLICY_FILE: &str = "policy.json";
pub const HISTORY_FILE: &str = "history.jsonl";

/// The radar state directory.
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Open `root`, creating it if needed. An unwritable location is an error.
    pub fn open(root: impl AsRef<Path>) -> StateResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| StateError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy_store(&self) -> FsPolicyStore {
        FsPolicyStore::new(self.root.join(POLICY_FILE))
    }

    pub fn history_store(&self) -> JsonlHistoryStore {
        JsonlHistoryStore::new(self.root.join(HISTORY_FILE))
    }
}

/// Policy stored as a single JSON document.
#[derive(Debug, Clone)]
pub struct FsPolicyStore {
    path: PathBuf,
}

impl FsPolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PolicyStore for FsPolicyStore {
    fn load(&self) -> StateResult<Option<Policy>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::io(&self.path, e)),
        };
        let policy =
            serde_json::from_str(&raw).map_err(|e| StateError::Deserialization {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(Some(policy))
    }

    fn save(&self, policy: &Policy) -> StateResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| StateError::io(dir, e))?;

        let mut content = serde_json::to_string_pretty(policy)?;
        content.push('\n');

        // Atomic write: temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StateError::io(dir, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| StateError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StateError::io(&self.path, e.error))?;
        Ok(())
    }
}

/// History stored as JSON lines, appended in place.
#[derive(Debug, Clone)]
pub struct JsonlHistoryStore {
    path: PathBuf,
}

impl JsonlHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonlHistoryStore {
    fn append(&self, records: &[HistoryRecord]) -> StateResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for record in records {
            buf.push_str(&serde_json::to_string(record)?);
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StateError::io(&self.path, e))?;
        file.write_all(buf.as_bytes())
            .map_err(|e| StateError::io(&self.path, e))?;
        Ok(())
    }

    fn read_recent(&self, limit: usize) -> StateResult<Vec<HistoryRecord>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StateError::io(&self.path, e)),
        };

        let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(limit);

        let mut out = Vec::with_capacity(lines.len() - start);
        for (offset, line) in lines[start..].iter().enumerate() {
            match serde_json::from_str::<HistoryRecord>(line) {
                Ok(record) => out.push(record),
                Err(e) => debug!(
                    event = "history.malformed_line",
                    line = start + offset + 1,
                    error = %e,
                ),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_policy_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPolicyStore::new(dir.path().join(POLICY_FILE));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_policy_is_a_deserialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(POLICY_FILE);
        fs::write(&path, "{ not json").unwrap();
        let err = FsPolicyStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StateError::Deserialization { .. }));
    }

    #[test]
    fn missing_history_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlHistoryStore::new(dir.path().join(HISTORY_FILE));
        assert!(store.read_recent(10).unwrap().is_empty());
    }

    #[test]
    fn state_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let state = StateDir::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(state.policy_store().path(), nested.join(POLICY_FILE));
    }
}
