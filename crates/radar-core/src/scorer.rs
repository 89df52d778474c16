//! Candidate scoring with canonical-source guardrails.
//!
//! [`score`] turns one [`RawHit`] into a [`ScoredCandidate`] across five
//! sub-scores (novelty, relevance, authority, impact, diversity), each in
//! `0..=5`, and a weighted integer total. Repos with a canonical source get a
//! guardrail: strict repos reject every non-canonical URL, other repos have
//! same-host homonyms capped instead of discarded.

use std::sync::OnceLock;

use radar_state::{Policy, SubScores, Weights};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{RadarError, RawHit, Result, ScoredCandidate};
use crate::seen::SeenIndex;
use crate::url::{domain_of, normalize_url};

/// Host assumed for canonical identifiers given as `owner/name`.
pub const DEFAULT_FORGE_HOST: &str = "github.com";

/// Subtracted from the total of low-authority meta-search hits.
pub const FALLBACK_PENALTY: u32 = 5;

/// Fixed diversity sub-score; real diversity is enforced by the selector.
pub const DIVERSITY_PLACEHOLDER: u8 = 3;

pub const TAG_NEW: &str = "new-to-radar";
pub const TAG_HIGH_SIGNAL: &str = "high-signal";
pub const TAG_FORGE: &str = "github";

fn re_forge_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)github\.com/[^/?#]+/[^/?#]+/(releases|pull|issues)\b")
            .expect("forge item pattern")
    })
}

fn re_releases_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)/releases\b").expect("releases pattern"))
}

fn re_impact_critical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(breaking|deprecat|\bcve-|security|vulnerab|\brca\b|postmortem|post-mortem|outage|incident)",
        )
        .expect("critical impact pattern")
    })
}

fn re_impact_notable() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(release|changelog|benchmark|performance|latency|profil)")
            .expect("notable impact pattern")
    })
}

// ---------------------------------------------------------------------------
// Canonical sources
// ---------------------------------------------------------------------------

/// A repo's authoritative location: `host` plus an `owner/name` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSource {
    host: String,
    path: String,
}

impl CanonicalSource {
    /// Parse `owner/name`, `host/owner/name`, or a full `https://` URL.
    /// Returns `None` when no path remains.
    pub fn parse(identifier: &str) -> Option<Self> {
        let lower = identifier.trim().to_lowercase();
        let bare = lower
            .strip_prefix("https://")
            .or_else(|| lower.strip_prefix("http://"))
            .unwrap_or(&lower)
            .trim_matches('/');

        let (host, path) = match bare.split_once('/') {
            Some((first, rest)) if first.contains('.') => (first, rest),
            _ => (DEFAULT_FORGE_HOST, bare),
        };
        let host = host.strip_prefix("www.").unwrap_or(host);
        let path = path.trim_matches('/');
        if host.is_empty() || path.is_empty() || path.contains(' ') {
            return None;
        }
        Some(Self {
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The `owner/name` part.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `host/owner/name`, as it appears inside a URL.
    pub fn prefix(&self) -> String {
        format!("{}/{}", self.host, self.path)
    }

    /// Whether `url` lives on this source's host at or below its path.
    pub fn contains_url(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        if host.strip_prefix("www.").unwrap_or(host) != self.host {
            return false;
        }
        let path = parsed.path().trim_matches('/').to_lowercase();
        path == self.path
            || path
                .strip_prefix(&self.path)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Check that every canonical source in `policy` parses.
pub fn validate_canonical_sources(policy: &Policy) -> Result<()> {
    for (repo, identifier) in &policy.canonical_sources {
        if CanonicalSource::parse(identifier).is_none() {
            return Err(RadarError::InvalidCanonicalSource {
                repo: repo.clone(),
                identifier: identifier.clone(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a hit produced no candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RejectReason {
    /// Strict repo and the URL is outside the canonical source.
    NonCanonicalSource { canonical: String },
}

/// A guardrail rejection. Not an error: the hit is deliberately dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub repo: String,
    pub url: String,
    pub reason: RejectReason,
}

/// Result of scoring one hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    Accepted(ScoredCandidate),
    Rejected(Rejection),
}

impl ScoreOutcome {
    pub fn accepted(self) -> Option<ScoredCandidate> {
        match self {
            Self::Accepted(c) => Some(c),
            Self::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score `hit` for `repo` under `policy`.
///
/// Pure: the result depends only on the arguments.
pub fn score(policy: &Policy, seen: &SeenIndex, repo: &str, hit: &RawHit) -> ScoreOutcome {
    let url = normalize_url(&hit.url);
    let domain = domain_of(&url);
    let url_lower = url.to_lowercase();
    let text = format!("{} {}", hit.title, hit.snippet).to_lowercase();
    let canonical = policy.canonical_source(repo).and_then(CanonicalSource::parse);

    let novelty = if seen.contains(&url) { 0 } else { 5 };
    let mut relevance = relevance(&text, &url_lower, repo, canonical.as_ref());
    let mut authority = authority(&url, &domain, &policy.authority_hosts);

    if let Some(source) = &canonical {
        let on_canonical = source.contains_url(&url);
        if !on_canonical {
            if policy.is_strict(repo) {
                return ScoreOutcome::Rejected(Rejection {
                    repo: repo.to_string(),
                    url,
                    reason: RejectReason::NonCanonicalSource {
                        canonical: source.prefix(),
                    },
                });
            }
            if domain == source.host() {
                relevance = relevance.min(1);
                authority = authority.min(2);
            }
        }
    }

    let scores = SubScores {
        novelty,
        relevance,
        authority,
        impact: impact(&text),
        diversity: DIVERSITY_PLACEHOLDER,
    };

    let mut total = apply_multiplier(weighted_total(&policy.weights, &scores), policy.multiplier_for(&domain));
    if hit.backend.is_fallback() && authority < 4 {
        total = total.saturating_sub(FALLBACK_PENALTY);
    }

    let mut tags = Vec::new();
    if novelty == 5 {
        tags.push(TAG_NEW.to_string());
    }
    if authority >= 4 {
        tags.push(TAG_HIGH_SIGNAL.to_string());
    }
    if domain == DEFAULT_FORGE_HOST {
        tags.push(TAG_FORGE.to_string());
    }
    tags.push(hit.backend.as_str().to_string());

    let title = if hit.title.trim().is_empty() {
        hit.url.clone()
    } else {
        hit.title.clone()
    };

    ScoreOutcome::Accepted(ScoredCandidate {
        url,
        title,
        repo: repo.to_string(),
        backend: hit.backend,
        domain,
        snippet: hit.snippet.clone(),
        scores,
        total,
        tags,
    })
}

/// 5 on a canonical or exact repo-name match, 4 on the space-separated
/// variant, 1 otherwise.
fn relevance(text: &str, url_lower: &str, repo: &str, canonical: Option<&CanonicalSource>) -> u8 {
    let repo_key = repo.to_lowercase();
    let canonical_match = canonical.is_some_and(|source| {
        text.contains(source.path()) || url_lower.contains(&source.prefix())
    });

    if canonical_match || (!repo_key.is_empty() && text.contains(&repo_key)) {
        5
    } else if repo_key.contains('-') && text.contains(&repo_key.replace('-', " ")) {
        4
    } else {
        1
    }
}

fn authority(url: &str, domain: &str, authority_hosts: &[String]) -> u8 {
    if re_forge_item().is_match(url) {
        5
    } else if re_releases_path().is_match(url)
        || authority_hosts
            .iter()
            .any(|h| !h.is_empty() && domain.contains(h.as_str()))
    {
        4
    } else {
        2
    }
}

/// First matching tier wins.
fn impact(text: &str) -> u8 {
    if re_impact_critical().is_match(text) {
        5
    } else if re_impact_notable().is_match(text) {
        4
    } else {
        2
    }
}

/// Weighted sum scaled to 0..=100. Zero total weight scores 0.
pub fn weighted_total(weights: &Weights, scores: &SubScores) -> u32 {
    let max = weights.sum() * 5.0;
    if max <= 0.0 {
        return 0;
    }
    let raw = weights.novelty * f64::from(scores.novelty)
        + weights.relevance * f64::from(scores.relevance)
        + weights.authority * f64::from(scores.authority)
        + weights.impact * f64::from(scores.impact)
        + weights.diversity * f64::from(scores.diversity);
    (raw / max * 100.0).round() as u32
}

pub fn apply_multiplier(total: u32, multiplier: f64) -> u32 {
    (f64::from(total) * multiplier).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_state::Backend;

    fn hit(url: &str, title: &str, snippet: &str) -> RawHit {
        RawHit::new(title, url, snippet, Backend::Exa)
    }

    #[test]
    fn canonical_source_forms() {
        let a = CanonicalSource::parse("Moltbot/Moltbot").unwrap();
        assert_eq!(a.host(), "github.com");
        assert_eq!(a.path(), "moltbot/moltbot");

        let b = CanonicalSource::parse("https://www.gitlab.com/group/proj/").unwrap();
        assert_eq!(b.prefix(), "gitlab.com/group/proj");

        assert!(CanonicalSource::parse("").is_none());
        assert!(CanonicalSource::parse("github.com/").is_none());
    }

    #[test]
    fn canonical_containment_respects_path_boundary() {
        let source = CanonicalSource::parse("acme/tool").unwrap();
        assert!(source.contains_url("https://github.com/acme/tool"));
        assert!(source.contains_url("https://github.com/Acme/Tool/releases/tag/v1"));
        assert!(source.contains_url("https://www.github.com/acme/tool/"));
        assert!(!source.contains_url("https://github.com/acme/toolkit"));
        assert!(!source.contains_url("https://github.com/other/tool"));
        assert!(!source.contains_url("https://gitlab.com/acme/tool"));
        assert!(!source.contains_url("not a url"));
    }

    #[test]
    fn relevance_tiers() {
        assert_eq!(relevance("tldr-swinton 0.4 notes", "", "tldr-swinton", None), 5);
        assert_eq!(relevance("tldr swinton benchmarks", "", "tldr-swinton", None), 4);
        assert_eq!(relevance("unrelated post", "", "tldr-swinton", None), 1);

        let source = CanonicalSource::parse("acme/widget").unwrap();
        assert_eq!(relevance("see acme/widget", "", "Widget-X", Some(&source)), 5);
        assert_eq!(
            relevance("nothing", "https://github.com/acme/widget/pull/3", "Widget-X", Some(&source)),
            5
        );
    }

    #[test]
    fn authority_tiers() {
        let hosts = radar_state::Policy::default().authority_hosts;
        assert_eq!(authority("https://github.com/a/b/releases/tag/v1", "github.com", &hosts), 5);
        assert_eq!(authority("https://github.com/a/b/issues/12", "github.com", &hosts), 5);
        assert_eq!(authority("https://gitlab.com/a/b/-/releases", "gitlab.com", &hosts), 4);
        assert_eq!(authority("https://docs.rs/tokio", "docs.rs", &hosts), 4);
        assert_eq!(authority("https://developer.chrome.com/blog", "developer.chrome.com", &hosts), 4);
        assert_eq!(authority("https://github.com/a/b", "github.com", &hosts), 2);
        assert_eq!(authority("https://medium.com/x", "medium.com", &hosts), 2);
    }

    #[test]
    fn impact_tiers_first_match_wins() {
        assert_eq!(impact("breaking change in v2 release"), 5);
        assert_eq!(impact("cve-2026-1234 advisory"), 5);
        assert_eq!(impact("outage postmortem"), 5);
        assert_eq!(impact("v1.2 release notes"), 4);
        assert_eq!(impact("latency benchmark"), 4);
        assert_eq!(impact("a nice blog post"), 2);
        // "rca" only as a word
        assert_eq!(impact("arcade game"), 2);
    }

    #[test]
    fn zero_weights_score_zero() {
        let weights = Weights {
            novelty: 0.0,
            relevance: 0.0,
            authority: 0.0,
            impact: 0.0,
            diversity: 0.0,
        };
        let scores = SubScores {
            novelty: 5,
            relevance: 5,
            authority: 5,
            impact: 5,
            diversity: 3,
        };
        assert_eq!(weighted_total(&weights, &scores), 0);
    }

    #[test]
    fn tags_in_order() {
        let policy = Policy::default();
        let c = score(
            &policy,
            &SeenIndex::new(),
            "Autarch",
            &hit("https://github.com/x/autarch/releases", "Autarch v3", ""),
        )
        .accepted()
        .unwrap();
        assert_eq!(c.tags, vec!["new-to-radar", "high-signal", "github", "exa"]);
    }

    #[test]
    fn blank_title_falls_back_to_url() {
        let policy = Policy::default();
        let c = score(
            &policy,
            &SeenIndex::new(),
            "Autarch",
            &hit("https://example.com/a", "  ", ""),
        )
        .accepted()
        .unwrap();
        assert_eq!(c.title, "https://example.com/a");
    }
}
