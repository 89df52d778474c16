//! Contract tests for PolicyStore and HistoryStore.
//!
//! Each contract runs against both the filesystem stores and the in-memory
//! fakes; any conforming implementation must pass these.

use chrono::{TimeZone, Utc};
use radar_state::fakes::{MemoryHistoryStore, MemoryPolicyStore};
use radar_state::{
    Backend, HistoryRecord, HistoryStore, Policy, PolicyStore, ScoreCard, StateDir, StateError,
    SubScores,
};

fn record(n: u32) -> HistoryRecord {
    HistoryRecord {
        ts: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        repo: "Autarch".to_string(),
        url: format!("https://example.com/post/{n}"),
        title: format!("post {n}"),
        backend: Backend::Exa,
        scores: ScoreCard {
            sub: SubScores {
                novelty: 5,
                relevance: 4,
                authority: 2,
                impact: 4,
                diversity: 3,
            },
            total: 80,
        },
        tags: vec!["new-to-radar".to_string(), "exa".to_string()],
    }
}

// ===========================================================================
// PolicyStore
// ===========================================================================

fn policy_init_writes_defaults(store: &dyn PolicyStore) {
    assert!(store.load().unwrap().is_none());
    let policy = store.load_or_init().unwrap();
    assert_eq!(policy, Policy::default());
    assert_eq!(store.load().unwrap(), Some(Policy::default()));
}

fn policy_existing_is_loaded_as_is(store: &dyn PolicyStore) {
    let mut custom = Policy::default();
    custom.limits.max_items_per_repo = 2;
    custom.searxng_base_url = "http://searx.internal:8080".to_string();
    store.save(&custom).unwrap();

    let loaded = store.load_or_init().unwrap();
    assert_eq!(loaded, custom);
}

fn policy_invalid_is_an_error(store: &dyn PolicyStore) {
    let mut bad = Policy::default();
    bad.weights.authority = -3.0;
    store.save(&bad).unwrap();

    let err = store.load_or_init().unwrap_err();
    assert!(matches!(err, StateError::InvalidPolicy(_)));
}

#[test]
fn fs_policy_contracts() {
    for check in [
        policy_init_writes_defaults as fn(&dyn PolicyStore),
        policy_existing_is_loaded_as_is,
        policy_invalid_is_an_error,
    ] {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::open(dir.path()).unwrap();
        check(&state.policy_store());
    }
}

#[test]
fn memory_policy_contracts() {
    for check in [
        policy_init_writes_defaults as fn(&dyn PolicyStore),
        policy_existing_is_loaded_as_is,
        policy_invalid_is_an_error,
    ] {
        check(&MemoryPolicyStore::new());
    }
}

// ===========================================================================
// HistoryStore
// ===========================================================================

fn history_append_then_read(store: &dyn HistoryStore) {
    store.append(&[record(1), record(2)]).unwrap();
    store.append(&[record(3)]).unwrap();

    let all = store.read_recent(100).unwrap();
    let urls: Vec<_> = all.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com/post/1",
            "https://example.com/post/2",
            "https://example.com/post/3",
        ]
    );
}

fn history_window_keeps_most_recent(store: &dyn HistoryStore) {
    let records: Vec<_> = (0..10).map(record).collect();
    store.append(&records).unwrap();

    let recent = store.read_recent(3).unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].url, "https://example.com/post/7");
    assert_eq!(recent[2].url, "https://example.com/post/9");
}

fn history_empty_append_is_noop(store: &dyn HistoryStore) {
    store.append(&[]).unwrap();
    assert!(store.read_recent(10).unwrap().is_empty());
}

#[test]
fn fs_history_contracts() {
    for check in [
        history_append_then_read as fn(&dyn HistoryStore),
        history_window_keeps_most_recent,
        history_empty_append_is_noop,
    ] {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::open(dir.path()).unwrap();
        check(&state.history_store());
    }
}

#[test]
fn memory_history_contracts() {
    for check in [
        history_append_then_read as fn(&dyn HistoryStore),
        history_window_keeps_most_recent,
        history_empty_append_is_noop,
    ] {
        check(&MemoryHistoryStore::new());
    }
}

#[test]
fn fs_history_skips_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::open(dir.path()).unwrap();
    let store = state.history_store();

    store.append(&[record(1)]).unwrap();
    let mut raw = std::fs::read_to_string(store.path()).unwrap();
    raw.push_str("{\"truncated\": \n");
    raw.push_str("not json at all\n");
    std::fs::write(store.path(), raw).unwrap();
    store.append(&[record(2)]).unwrap();

    let records = store.read_recent(100).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].url, "https://example.com/post/2");
}

#[test]
fn fs_history_lines_are_single_json_objects() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::open(dir.path()).unwrap();
    let store = state.history_store();
    store.append(&[record(1), record(2)]).unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let lines: Vec<_> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(v["repo"], "Autarch");
        assert_eq!(v["scores"]["total"], 80);
    }
}
