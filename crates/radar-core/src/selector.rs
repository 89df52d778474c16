//! Diversity-constrained selection.
//!
//! [`select`] admits candidates greedily by total under a per-repo cap, then
//! runs a diversity repair pass that swaps low-ranked items from repos holding
//! several slots for the best candidate of a missing tracked repo. The repair
//! is a greedy heuristic, not an optimal assignment: with several repos
//! missing at once it can evict in an order a global solver would not.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use radar_state::Policy;

use crate::domain::{ScoredCandidate, SelectionResult};

/// Selection order: total descending, then url ascending.
pub fn rank(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.total.cmp(&a.total).then_with(|| a.url.cmp(&b.url))
}

/// Keep, per normalized url, the highest-total candidate. On equal totals the
/// first one seen wins. Output preserves first-seen order.
pub fn dedupe_by_url(candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ScoredCandidate> = Vec::new();
    for candidate in candidates {
        match index.get(&candidate.url) {
            Some(&i) => {
                if candidate.total > out[i].total {
                    out[i] = candidate;
                }
            }
            None => {
                index.insert(candidate.url.clone(), out.len());
                out.push(candidate);
            }
        }
    }
    out
}

/// Slot bookkeeping for the admitted set.
struct Admitted<'a> {
    items: Vec<&'a ScoredCandidate>,
    per_repo: HashMap<&'a str, usize>,
    urls: HashSet<&'a str>,
}

impl<'a> Admitted<'a> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            per_repo: HashMap::new(),
            urls: HashSet::new(),
        }
    }

    fn slots(&self, repo: &str) -> usize {
        self.per_repo.get(repo).copied().unwrap_or(0)
    }

    fn repos_represented(&self) -> usize {
        self.per_repo.values().filter(|n| **n > 0).count()
    }

    fn admit(&mut self, candidate: &'a ScoredCandidate) {
        self.items.push(candidate);
        self.urls.insert(candidate.url.as_str());
        *self.per_repo.entry(candidate.repo.as_str()).or_insert(0) += 1;
    }

    fn evict(&mut self, idx: usize) -> &'a ScoredCandidate {
        let evicted = self.items.swap_remove(idx);
        self.urls.remove(evicted.url.as_str());
        if let Some(n) = self.per_repo.get_mut(evicted.repo.as_str()) {
            *n -= 1;
        }
        evicted
    }

    /// Worst-ranked admitted item whose repo holds more than one slot.
    fn eviction_candidate(&self) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, c)| self.slots(&c.repo) > 1)
            .max_by(|(_, a), (_, b)| rank(a, b))
            .map(|(i, _)| i)
    }
}

/// Select a bounded, diverse subset of `candidates`.
///
/// Guarantees: no repo exceeds `limits.max_items_per_repo`; the set never
/// grows past `limits.max_items_total` when one is set; no url appears twice;
/// repair never removes a repo's only item. Repair targets the tracked
/// repos of `policy.repos` in roster order and stops once
/// `limits.min_repos_represented` is met or no repo holds a spare slot.
pub fn select(policy: &Policy, candidates: &[ScoredCandidate]) -> SelectionResult {
    let cap = policy.limits.max_items_per_repo;
    let min_repos = policy.limits.min_repos_represented;
    let total_cap = policy.limits.max_items_total.unwrap_or(usize::MAX);

    let mut sorted: Vec<&ScoredCandidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| rank(a, b));

    let mut admitted = Admitted::new();
    for candidate in sorted.iter().copied() {
        if admitted.items.len() >= total_cap {
            break;
        }
        if admitted.slots(&candidate.repo) >= cap
            || admitted.urls.contains(candidate.url.as_str())
        {
            continue;
        }
        admitted.admit(candidate);
    }

    if admitted.repos_represented() < min_repos {
        for tracked in &policy.repos {
            if admitted.repos_represented() >= min_repos {
                break;
            }
            let repo = tracked.name.as_str();
            if admitted.slots(repo) > 0 {
                continue;
            }
            let Some(replacement) = sorted
                .iter()
                .copied()
                .find(|c| c.repo == repo && !admitted.urls.contains(c.url.as_str()))
            else {
                continue;
            };
            let Some(idx) = admitted.eviction_candidate() else {
                break;
            };
            let evicted = admitted.evict(idx);
            tracing::debug!(
                event = "selection.repair",
                evicted_repo = %evicted.repo,
                evicted_url = %evicted.url,
                admitted_repo = %repo,
                admitted_url = %replacement.url,
            );
            admitted.admit(replacement);
        }
    }

    let mut items: Vec<ScoredCandidate> = admitted.items.into_iter().cloned().collect();
    items.sort_by(rank);
    SelectionResult { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_state::{Backend, SubScores, TrackedRepo};

    fn cand(repo: &str, url: &str, total: u32) -> ScoredCandidate {
        ScoredCandidate {
            url: url.to_string(),
            title: url.to_string(),
            repo: repo.to_string(),
            backend: Backend::Exa,
            domain: "example.com".to_string(),
            snippet: String::new(),
            scores: SubScores {
                novelty: 5,
                relevance: 1,
                authority: 2,
                impact: 2,
                diversity: 3,
            },
            total,
            tags: vec![],
        }
    }

    fn policy(repos: &[&str], cap: usize, min_repos: usize) -> Policy {
        let mut p = Policy::default();
        p.repos = repos.iter().map(|r| TrackedRepo::new(r, "")).collect();
        p.limits.max_items_per_repo = cap;
        p.limits.min_repos_represented = min_repos;
        p
    }

    #[test]
    fn dedupe_keeps_best_and_first_on_tie() {
        let out = dedupe_by_url(vec![
            cand("a", "https://x/1", 50),
            cand("b", "https://x/1", 70),
            cand("a", "https://x/2", 40),
            cand("c", "https://x/2", 40),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].repo, "b");
        assert_eq!(out[1].repo, "a");
    }

    #[test]
    fn ties_break_by_url() {
        let p = policy(&["a"], 3, 1);
        let out = select(
            &p,
            &[cand("a", "https://x/b", 60), cand("a", "https://x/a", 60)],
        );
        assert_eq!(out.items[0].url, "https://x/a");
        assert_eq!(out.items[1].url, "https://x/b");
    }

    #[test]
    fn greedy_admits_everything_under_cap_when_unbounded() {
        let p = policy(&["a", "b"], 3, 2);
        let out = select(
            &p,
            &[
                cand("a", "https://a/1", 90),
                cand("a", "https://a/2", 80),
                cand("a", "https://a/3", 70),
                cand("a", "https://a/4", 65),
                cand("b", "https://b/1", 10),
            ],
        );
        assert_eq!(out.len(), 4);
        assert_eq!(out.for_repo("a").count(), 3);
        assert_eq!(out.repos_represented().len(), 2);
    }

    #[test]
    fn repair_evicts_worst_from_multi_slot_repo() {
        let mut p = policy(&["a", "b"], 3, 2);
        p.limits.max_items_total = Some(3);
        let out = select(
            &p,
            &[
                cand("a", "https://a/1", 90),
                cand("a", "https://a/2", 80),
                cand("a", "https://a/3", 70),
                cand("b", "https://b/1", 10),
            ],
        );
        let urls: Vec<_> = out.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a/1", "https://a/2", "https://b/1"]);
    }

    #[test]
    fn repair_never_removes_sole_item() {
        let mut p = policy(&["a", "b", "c"], 3, 3);
        p.limits.max_items_total = Some(2);
        let out = select(
            &p,
            &[
                cand("a", "https://a/1", 90),
                cand("b", "https://b/1", 80),
                cand("c", "https://c/1", 70),
            ],
        );
        let urls: Vec<_> = out.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a/1", "https://b/1"]);
    }

    #[test]
    fn repair_stops_once_threshold_met() {
        let mut p = policy(&["a", "b", "c"], 3, 2);
        p.limits.max_items_total = Some(3);
        let out = select(
            &p,
            &[
                cand("a", "https://a/1", 90),
                cand("a", "https://a/2", 85),
                cand("a", "https://a/3", 80),
                cand("b", "https://b/1", 20),
                cand("c", "https://c/1", 30),
            ],
        );
        // only one swap is needed to reach two repos; b comes first in the roster
        assert_eq!(out.repos_represented().len(), 2);
        assert_eq!(out.for_repo("b").count(), 1);
        assert_eq!(out.for_repo("c").count(), 0);
        assert_eq!(out.len(), 3);
    }
}
