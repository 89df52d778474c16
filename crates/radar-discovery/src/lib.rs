//! Discovery backends for the repo radar.
//!
//! Two collaborator contracts:
//! - [`WebSearcher`]: free-text query plus a result-count hint, returning
//!   `{title, url, snippet}` hits ([`ExaSearcher`], [`NoopSearcher`])
//! - [`MetaSearcher`]: base endpoint plus a free-text query, returning
//!   `{title, url, content}` hits ([`SearxngSearcher`])
//!
//! Both return an empty list for "no results" and an error only for
//! transport failures.

mod error;
pub mod exa;
pub mod searxng;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{DiscoveryError, DiscoveryResult};
pub use exa::ExaSearcher;
pub use searxng::SearxngSearcher;

/// Request timeout applied by the HTTP backends.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum snippet length kept from a primary-search hit, in characters.
pub const MAX_SNIPPET_CHARS: usize = 800;

/// A primary web-search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A meta-search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaHit {
    pub title: String,
    pub url: String,
    pub content: String,
}

// --- WebSearcher trait ---

#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> DiscoveryResult<Vec<SearchHit>>;
}

// --- MetaSearcher trait ---

#[async_trait]
pub trait MetaSearcher: Send + Sync {
    async fn search(&self, base_url: &str, query: &str) -> DiscoveryResult<Vec<MetaHit>>;
}

/// No-op searcher for when no API key is configured.
pub struct NoopSearcher;

#[async_trait]
impl WebSearcher for NoopSearcher {
    async fn search(&self, _query: &str, _max_results: usize) -> DiscoveryResult<Vec<SearchHit>> {
        Ok(Vec::new())
    }
}

pub(crate) fn http_client(backend: &'static str) -> DiscoveryResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| DiscoveryError::Config {
            backend,
            reason: e.to_string(),
        })
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
