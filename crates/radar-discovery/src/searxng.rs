//! SearXNG meta-search (fallback backend).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::{http_client, truncate_chars, MetaHit, MetaSearcher};

const BACKEND: &str = "searxng";

pub struct SearxngSearcher {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl SearxngSearcher {
    pub fn new() -> DiscoveryResult<Self> {
        Ok(Self {
            client: http_client(BACKEND)?,
        })
    }
}

/// `<base>/search`, tolerating a trailing slash on the base.
pub fn search_endpoint(base_url: &str) -> String {
    format!("{}/search", base_url.trim_end_matches('/'))
}

/// Decode a SearXNG JSON response body. Results with a missing, null or
/// empty url are dropped; null text fields read as empty.
pub fn parse_response(body: &str) -> DiscoveryResult<Vec<MetaHit>> {
    let parsed: SearxngResponse =
        serde_json::from_str(body).map_err(|e| DiscoveryError::Decode {
            backend: BACKEND,
            reason: e.to_string(),
        })?;

    Ok(parsed
        .results
        .into_iter()
        .filter_map(|r| {
            let url = r.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
            Some(MetaHit {
                title: r.title.unwrap_or_default(),
                url,
                content: r.content.unwrap_or_default(),
            })
        })
        .collect())
}

#[async_trait]
impl MetaSearcher for SearxngSearcher {
    async fn search(&self, base_url: &str, query: &str) -> DiscoveryResult<Vec<MetaHit>> {
        let endpoint = search_endpoint(base_url);
        debug!(query, endpoint = %endpoint, "SearXNG search");

        let resp = self
            .client
            .get(&endpoint)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|source| DiscoveryError::Http {
                backend: BACKEND,
                source,
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|source| DiscoveryError::Http {
            backend: BACKEND,
            source,
        })?;
        if !status.is_success() {
            return Err(DiscoveryError::Status {
                backend: BACKEND,
                status: status.as_u16(),
                body: truncate_chars(&text, 200),
            });
        }

        parse_response(&text)
    }
}
