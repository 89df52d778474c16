//! Persisted records: the radar policy and the selection history.
//!
//! Both are plain serde documents. The policy is a single pretty-printed JSON
//! file; history is one [`HistoryRecord`] per line.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Current policy schema version written by [`Policy::default`].
pub const POLICY_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Discovery backend that produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Primary web-search provider.
    Exa,
    /// Meta-search fallback.
    Searxng,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exa => "exa",
            Self::Searxng => "searxng",
        }
    }

    /// Whether hits from this backend are subject to the fallback penalty.
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Searxng)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Weight vector over the five scoring dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub novelty: f64,
    pub relevance: f64,
    pub authority: f64,
    pub impact: f64,
    pub diversity: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.novelty + self.relevance + self.authority + self.impact + self.diversity
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("novelty", self.novelty),
            ("relevance", self.relevance),
            ("authority", self.authority),
            ("impact", self.impact),
            ("diversity", self.diversity),
        ]
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            novelty: 30.0,
            relevance: 30.0,
            authority: 20.0,
            impact: 15.0,
            diversity: 5.0,
        }
    }
}

/// Numeric limits that bound discovery and selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Result-count hint passed to the primary searcher.
    pub results_per_query: usize,
    /// How many per-repo query templates are used each run.
    pub per_repo_queries: usize,
    /// How many cross-repo query templates are used each run.
    pub cross_repo_queries: usize,
    /// Meta-search hits scored per repo when the backstop fires.
    pub fallback_results: usize,
    /// Backstop fires for repos with fewer novel candidates than this.
    pub fallback_min_novel: usize,
    /// Per-repo cap in the final selection.
    pub max_items_per_repo: usize,
    /// Diversity repair target.
    pub min_repos_represented: usize,
    /// Optional bound on the whole selection; unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items_total: Option<usize>,
    /// Most recent history lines read when building the seen index.
    pub history_window: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            results_per_query: 8,
            per_repo_queries: 4,
            cross_repo_queries: 2,
            fallback_results: 6,
            fallback_min_novel: 2,
            max_items_per_repo: 3,
            min_repos_represented: 6,
            max_items_total: None,
            history_window: 50_000,
        }
    }
}

/// Query templates. `{repo}` is substituted in per-repo templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryTemplates {
    pub per_repo: Vec<String>,
    pub cross_repo: Vec<String>,
}

impl Default for QueryTemplates {
    fn default() -> Self {
        Self {
            per_repo: [
                "{repo} release notes",
                "{repo} changelog",
                "{repo} breaking changes",
                "{repo} security advisory",
                "{repo} performance regression",
                "{repo} benchmark",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            cross_repo: [
                "Rust perf profiling flamegraph 2026",
                "Tauri performance profiling 2026",
                "Go OpenTelemetry best practices 2026",
                "MCP server testing visual regression TUI",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// A repository on the radar, with the purpose line shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRepo {
    pub name: String,
    #[serde(default)]
    pub purpose: String,
}

impl TrackedRepo {
    pub fn new(name: &str, purpose: &str) -> Self {
        Self {
            name: name.to_string(),
            purpose: purpose.to_string(),
        }
    }
}

fn default_roster() -> Vec<TrackedRepo> {
    vec![
        TrackedRepo::new("tool-time", "internal tooling/docs/scripts around agent tooling; fast iteration, integration quality"),
        TrackedRepo::new("Ong-Lots", "Next.js + Prisma (Postgres) app using LLM SDK; product quality, data correctness, speed, testability, deployment ergonomics"),
        TrackedRepo::new("Autarch", "Go monorepo for AI agent dev tools; developer experience, reliability, orchestration workflows, research intel"),
        TrackedRepo::new("moltbot", "open-source personal AI assistant + gateway/channels/skills; robustness, security, plugin ecosystem, contributor DX"),
        TrackedRepo::new("shadow-work", "Rust + Tauri grand strategy / moral laboratory sim; simulation scale, performance, correctness, profiling/testing tooling"),
        TrackedRepo::new("ong-back", "Chrome extension converting Twitter videos to text; UX/DX, model quality, latency/cost, extension best practices"),
        TrackedRepo::new("Intermute", "Go coordination/messaging service for Autarch agents; reliability, observability, API design, security boundaries"),
        TrackedRepo::new("tldr-swinton", "token-efficient code analysis tooling; analysis quality, benchmark methodology, language support, agent workflow integration"),
        TrackedRepo::new("tuivision", "MCP server for TUI automation/visual testing; devex, stability, compatibility with agent CLI workflows, test reliability"),
        TrackedRepo::new("pattern-royale", "Rust backend + web frontend real-time multiplayer CA arena; correctness, performance, networking, rapid iteration"),
        TrackedRepo::new("interdoc", "recursive AGENTS.md generator; devex, reliability, compatibility across agent CLIs"),
        TrackedRepo::new("interpeer", "cross-AI peer review plugin; devex, correctness of review flows, safe prompt/context handling"),
        TrackedRepo::new("Linsenkasten", "MCP server + CLI + web + API for FLUX lenses; product UX, API correctness, schema/contracts, deployment reliability"),
    ]
}

/// Versioned radar configuration.
///
/// Read-only for the duration of a run. Every field has a default so that
/// policy files written by older versions keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub version: u32,
    /// Reserved for exploration sampling; scoring does not read it.
    pub exploration_rate: f64,
    pub weights: Weights,
    /// Total-score multiplier per domain (`www.` already stripped).
    pub domain_multipliers: BTreeMap<String, f64>,
    /// Host fragments treated as high-authority documentation/registry hosts.
    pub authority_hosts: Vec<String>,
    /// Repo name -> canonical source identifier (`owner/name` or `host/owner/name`).
    pub canonical_sources: BTreeMap<String, String>,
    /// Repos for which non-canonical URLs are rejected outright.
    pub strict_repos: BTreeSet<String>,
    pub query_templates: QueryTemplates,
    pub limits: Limits,
    pub searxng_base_url: String,
    pub repos: Vec<TrackedRepo>,
}

impl Default for Policy {
    fn default() -> Self {
        let domain_multipliers = [
            ("github.com", 1.15),
            ("docs.rs", 1.10),
            ("crates.io", 1.05),
            ("go.dev", 1.05),
            ("developer.chrome.com", 1.10),
        ]
        .iter()
        .map(|(d, m)| (d.to_string(), *m))
        .collect();

        Self {
            version: POLICY_VERSION,
            exploration_rate: 0.12,
            weights: Weights::default(),
            domain_multipliers,
            authority_hosts: ["docs.", "developer.", "go.dev", "docs.rs", "crates.io"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            canonical_sources: BTreeMap::new(),
            strict_repos: BTreeSet::new(),
            query_templates: QueryTemplates::default(),
            limits: Limits::default(),
            searxng_base_url: "http://127.0.0.1:8081".to_string(),
            repos: default_roster(),
        }
    }
}

impl Policy {
    /// Multiplier for `domain`, 1.0 when unconfigured.
    pub fn multiplier_for(&self, domain: &str) -> f64 {
        self.domain_multipliers.get(domain).copied().unwrap_or(1.0)
    }

    pub fn canonical_source(&self, repo: &str) -> Option<&str> {
        self.canonical_sources.get(repo).map(String::as_str)
    }

    pub fn is_strict(&self, repo: &str) -> bool {
        self.strict_repos.contains(repo)
    }

    pub fn purpose_of(&self, repo: &str) -> Option<&str> {
        self.repos
            .iter()
            .find(|r| r.name == repo)
            .map(|r| r.purpose.as_str())
            .filter(|p| !p.is_empty())
    }

    /// Tracked repo names in roster order.
    pub fn tracked_repo_names(&self) -> Vec<String> {
        self.repos.iter().map(|r| r.name.clone()).collect()
    }

    /// Check the policy invariants: weights and multipliers are finite and
    /// non-negative, caps and minimums are positive, strict repos have a
    /// canonical source.
    pub fn validate(&self) -> Result<(), StateError> {
        for (name, w) in self.weights.named() {
            if !w.is_finite() || w < 0.0 {
                return Err(StateError::InvalidPolicy(format!(
                    "weights.{name} must be a non-negative number, got {w}"
                )));
            }
        }
        for (domain, m) in &self.domain_multipliers {
            if !m.is_finite() || *m < 0.0 {
                return Err(StateError::InvalidPolicy(format!(
                    "domain multiplier for {domain} must be non-negative, got {m}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.exploration_rate) {
            return Err(StateError::InvalidPolicy(format!(
                "exploration_rate must be within [0, 1], got {}",
                self.exploration_rate
            )));
        }

        let positive = [
            ("results_per_query", self.limits.results_per_query),
            ("max_items_per_repo", self.limits.max_items_per_repo),
            ("min_repos_represented", self.limits.min_repos_represented),
            ("history_window", self.limits.history_window),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(StateError::InvalidPolicy(format!(
                    "limits.{name} must be a positive integer"
                )));
            }
        }

        if self.limits.max_items_total == Some(0) {
            return Err(StateError::InvalidPolicy(
                "limits.max_items_total must be positive when set".to_string(),
            ));
        }

        if let Some(repo) = self
            .strict_repos
            .iter()
            .find(|r| !self.canonical_sources.contains_key(*r))
        {
            return Err(StateError::InvalidPolicy(format!(
                "strict repo {repo} has no canonical source"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// The five per-dimension sub-scores, each in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubScores {
    pub novelty: u8,
    pub relevance: u8,
    pub authority: u8,
    pub impact: u8,
    pub diversity: u8,
}

impl SubScores {
    pub fn as_array(&self) -> [u8; 5] {
        [
            self.novelty,
            self.relevance,
            self.authority,
            self.impact,
            self.diversity,
        ]
    }
}

/// Sub-scores plus the derived total, as stored in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    #[serde(flatten)]
    pub sub: SubScores,
    pub total: u32,
}

/// One selected item from one run. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub ts: DateTime<Utc>,
    pub repo: String,
    pub url: String,
    pub title: String,
    pub backend: Backend,
    pub scores: ScoreCard,
    #[serde(default)]
    pub tags: Vec<String>,
}
