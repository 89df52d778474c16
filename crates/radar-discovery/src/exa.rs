//! Exa web search (primary backend).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::{http_client, truncate_chars, SearchHit, WebSearcher, MAX_SNIPPET_CHARS};

const BACKEND: &str = "exa";
pub const DEFAULT_ENDPOINT: &str = "https://api.exa.ai/search";

pub struct ExaSearcher {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl ExaSearcher {
    pub fn new(api_key: &str) -> DiscoveryResult<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client: http_client(BACKEND)?,
        })
    }

    /// Point the client at a different search endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

/// Decode an Exa search response body into hits.
///
/// Results without a url are dropped; a missing or blank title falls back to
/// the url; text is trimmed and cut to [`MAX_SNIPPET_CHARS`].
pub fn parse_response(body: &str) -> DiscoveryResult<Vec<SearchHit>> {
    let parsed: ExaResponse = serde_json::from_str(body).map_err(|e| DiscoveryError::Decode {
        backend: BACKEND,
        reason: e.to_string(),
    })?;

    Ok(parsed
        .results
        .into_iter()
        .filter_map(|r| {
            let url = r.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
            let title = r
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| url.clone());
            let snippet = truncate_chars(r.text.as_deref().unwrap_or("").trim(), MAX_SNIPPET_CHARS);
            Some(SearchHit {
                title,
                url,
                snippet,
            })
        })
        .collect())
}

#[async_trait]
impl WebSearcher for ExaSearcher {
    async fn search(&self, query: &str, max_results: usize) -> DiscoveryResult<Vec<SearchHit>> {
        debug!(query, max_results, "Exa search");

        let body = serde_json::json!({
            "query": query,
            "numResults": max_results,
            "type": "fast",
            "contents": { "text": { "maxCharacters": MAX_SNIPPET_CHARS } },
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&body)
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
