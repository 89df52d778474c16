//! Run orchestration: discovery → scoring → dedup → selection.
//!
//! Discovery calls run sequentially. A failing call is logged and counts as
//! zero hits; it never aborts the run. The orchestrator does not persist
//! anything: callers append [`RunOutcome::selection`] to history once the run
//! has completed (see [`record_selection`]).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use radar_discovery::{MetaSearcher, WebSearcher};
use radar_state::{Backend, HistoryStore, Policy};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::{RawHit, Result, ScoredCandidate, SelectionResult, CROSS_REPO};
use crate::obs;
use crate::scorer::{score, validate_canonical_sources, ScoreOutcome};
use crate::seen::SeenIndex;
use crate::selector::{dedupe_by_url, select};

/// Query sent to the fallback backend for a repo.
pub fn fallback_query(repo: &str) -> String {
    format!("{repo} release notes")
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub repos: Vec<String>,
    pub selection: SelectionResult,
    /// Unique candidates after URL dedup.
    pub considered: usize,
    /// Hits dropped by the canonical-source guardrail.
    pub rejected: usize,
    /// Discovery calls that failed and contributed nothing.
    pub discovery_failures: usize,
}

/// Candidates accumulated during discovery.
#[derive(Default)]
struct Collected {
    candidates: Vec<ScoredCandidate>,
    rejected: usize,
    discovery_failures: usize,
}

impl Collected {
    fn novel_for(&self, repo: &str) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.repo == repo && c.is_novel())
            .count()
    }
}

/// Drives discovery backends for a set of repos and selects the run's items.
pub struct Orchestrator {
    policy: Policy,
    seen: SeenIndex,
    primary: Arc<dyn WebSearcher>,
    fallback: Option<Arc<dyn MetaSearcher>>,
    fallback_base_url: String,
}

impl Orchestrator {
    /// Build an orchestrator. Fails if a canonical source in `policy` cannot
    /// be parsed.
    pub fn new(policy: Policy, seen: SeenIndex, primary: Arc<dyn WebSearcher>) -> Result<Self> {
        validate_canonical_sources(&policy)?;
        let fallback_base_url = policy.searxng_base_url.clone();
        Ok(Self {
            policy,
            seen,
            primary,
            fallback: None,
            fallback_base_url,
        })
    }

    /// Enable the meta-search backstop.
    pub fn with_fallback(mut self, fallback: Arc<dyn MetaSearcher>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Override the backstop endpoint from the policy.
    pub fn with_fallback_base_url(mut self, base_url: &str) -> Self {
        self.fallback_base_url = base_url.to_string();
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Run discovery, scoring and selection for `repos`.
    pub async fn run(&self, repos: &[String]) -> RunOutcome {
        let run_id = Uuid::new_v4();
        self.run_inner(run_id, repos)
            .instrument(obs::run_span(run_id))
            .await
    }

    async fn run_inner(&self, run_id: Uuid, repos: &[String]) -> RunOutcome {
        obs::emit_run_started(repos.len(), self.seen.len());

        let mut collected = Collected::default();
        self.collect_per_repo(repos, &mut collected).await;
        self.collect_cross_repo(repos, &mut collected).await;
        self.collect_fallback(repos, &mut collected).await;

        let unique = dedupe_by_url(collected.candidates);
        let selection = select(&self.policy, &unique);

        obs::emit_run_finished(
            unique.len(),
            collected.rejected,
            selection.len(),
            selection.repos_represented().len(),
        );

        RunOutcome {
            run_id,
            repos: repos.to_vec(),
            selection,
            considered: unique.len(),
            rejected: collected.rejected,
            discovery_failures: collected.discovery_failures,
        }
    }

    fn ingest(&self, repo: &str, hit: &RawHit, collected: &mut Collected) {
        if hit.url.trim().is_empty() {
            return;
        }
        match score(&self.policy, &self.seen, repo, hit) {
            ScoreOutcome::Accepted(candidate) => collected.candidates.push(candidate),
            ScoreOutcome::Rejected(rejection) => {
                obs::emit_candidate_rejected(&rejection);
                collected.rejected += 1;
            }
        }
    }

    async fn primary_search(
        &self,
        repo: &str,
        query: &str,
        collected: &mut Collected,
    ) -> Vec<RawHit> {
        let backend = Backend::Exa;
        match self
            .primary
            .search(query, self.policy.limits.results_per_query)
            .await
        {
            Ok(hits) => {
                obs::emit_discovery_finished(backend.as_str(), repo, query, hits.len());
                hits.into_iter()
                    .map(|h| RawHit::new(&h.title, &h.url, &h.snippet, backend))
                    .collect()
            }
            Err(e) => {
                obs::emit_discovery_failed(backend.as_str(), repo, query, &e);
                collected.discovery_failures += 1;
                Vec::new()
            }
        }
    }

    async fn collect_per_repo(&self, repos: &[String], collected: &mut Collected) {
        let templates: Vec<&String> = self
            .policy
            .query_templates
            .per_repo
            .iter()
            .take(self.policy.limits.per_repo_queries)
            .collect();
        for repo in repos {
            for template in &templates {
                let query = template.replace("{repo}", repo);
                for hit in self.primary_search(repo, &query, collected).await {
                    self.ingest(repo, &hit, collected);
                }
            }
        }
    }

    /// Cross-repo hits go to the first requested repo named in the title,
    /// else to [`CROSS_REPO`].
    async fn collect_cross_repo(&self, repos: &[String], collected: &mut Collected) {
        let queries: Vec<&String> = self
            .policy
            .query_templates
            .cross_repo
            .iter()
            .take(self.policy.limits.cross_repo_queries)
            .collect();

        for query in queries {
            for hit in self.primary_search(CROSS_REPO, query, collected).await {
                let owner = assign_repo(&hit.title, repos);
                self.ingest(owner, &hit, collected);
            }
        }
    }

    async fn collect_fallback(&self, repos: &[String], collected: &mut Collected) {
        let Some(fallback) = &self.fallback else {
            return;
        };
        let backend = Backend::Searxng;

        for repo in repos {
            let novel = collected.novel_for(repo);
            if novel >= self.policy.limits.fallback_min_novel {
                continue;
            }
            obs::emit_fallback_triggered(repo, novel);

            let query = fallback_query(repo);
            let hits = match fallback.search(&self.fallback_base_url, &query).await {
                Ok(hits) => hits,
                Err(e) => {
                    obs::emit_discovery_failed(backend.as_str(), repo, &query, &e);
                    collected.discovery_failures += 1;
                    continue;
                }
            };
            obs::emit_discovery_finished(backend.as_str(), repo, &query, hits.len());

            for hit in hits.iter().take(self.policy.limits.fallback_results) {
                let raw = RawHit::new(&hit.title, &hit.url, &hit.content, backend);
                self.ingest(repo, &raw, collected);
            }
        }
    }
}

/// First repo in `repos` whose lowercase name occurs in the lowercase title.
pub fn assign_repo<'a>(title: &str, repos: &'a [String]) -> &'a str {
    let title = title.to_lowercase();
    repos
        .iter()
        .find(|r| !r.is_empty() && title.contains(&r.to_lowercase()))
        .map(String::as_str)
        .unwrap_or(CROSS_REPO)
}

/// Append the selection to history, stamped with `ts`. Returns the number
/// of records written.
pub fn record_selection(
    store: &dyn HistoryStore,
    selection: &SelectionResult,
    ts: DateTime<Utc>,
) -> Result<usize> {
    let records = selection.history_records(ts);
    store.append(&records)?;
    obs::emit_history_appended(records.len());
    Ok(records.len())
}
