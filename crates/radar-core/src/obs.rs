//! Structured observability hooks for radar run lifecycle events.
//!
//! Every event carries an `event` field so JSON logs can be filtered on it.
//! Set `RUST_LOG` to adjust verbosity; pass `--json` for JSON lines.

use radar_discovery::DiscoveryError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::scorer::Rejection;

/// Span covering one radar run, tagged with its id.
pub fn run_span(run_id: Uuid) -> tracing::Span {
    tracing::info_span!("radar.run", run_id = %run_id)
}

/// Emit event: run started.
pub fn emit_run_started(repos: usize, seen_urls: usize) {
    info!(event = "run.started", repos = repos, seen_urls = seen_urls);
}

/// Emit event: a discovery call failed and was treated as zero results.
pub fn emit_discovery_failed(backend: &str, repo: &str, query: &str, error: &DiscoveryError) {
    warn!(
        event = "discovery.failed",
        backend = %backend,
        repo = %repo,
        query = %query,
        error = %error,
    );
}

/// Emit event: a discovery call returned.
pub fn emit_discovery_finished(backend: &str, repo: &str, query: &str, hits: usize) {
    debug!(event = "discovery.finished", backend = %backend, repo = %repo, query = %query, hits = hits);
}

/// Emit event: the fallback backstop fired for a repo.
pub fn emit_fallback_triggered(repo: &str, novel: usize) {
    info!(event = "discovery.fallback", repo = %repo, novel_candidates = novel);
}

/// Emit event: the canonical-source guardrail dropped a hit.
pub fn emit_candidate_rejected(rejection: &Rejection) {
    debug!(
        event = "candidate.rejected",
        repo = %rejection.repo,
        url = %rejection.url,
        reason = ?rejection.reason,
    );
}

/// Emit event: selection finished.
pub fn emit_run_finished(considered: usize, rejected: usize, selected: usize, repos_represented: usize) {
    info!(
        event = "run.finished",
        considered = considered,
        rejected = rejected,
        selected = selected,
        repos_represented = repos_represented,
    );
}

/// Emit event: selected items appended to history.
pub fn emit_history_appended(records: usize) {
    info!(event = "history.appended", records = records);
}
