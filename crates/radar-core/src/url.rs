//! URL canonicalization so the same resource compares equal across backends
//! and across runs.

use url::{form_urlencoded, Url};

/// Query keys dropped in addition to every `utm_*` key.
const TRACKING_PARAMS: &[&str] = &["ref", "source"];

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

/// Strip tracking parameters and the fragment.
///
/// Unparseable input is returned unchanged. Surviving query segments are kept
/// byte for byte, so a URL reads the same with or without tracking keys; the
/// query is dropped entirely if nothing remains. Idempotent.
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    if let Some(query) = parsed.query() {
        let kept: Vec<&str> = query
            .split('&')
            .filter(|segment| !segment.is_empty() && !is_tracking_segment(segment))
            .collect();
        let kept = kept.join("&");
        parsed.set_query(if kept.is_empty() { None } else { Some(kept.as_str()) });
    }

    parsed.set_fragment(None);
    parsed.to_string()
}

/// Whether the decoded key of a raw `key[=value]` segment is a tracking key.
fn is_tracking_segment(segment: &str) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .is_some_and(|(key, _)| is_tracking_param(&key))
}

/// Hostname without a leading `www.`, or empty when `raw` has none.
pub fn domain_of(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.strip_prefix("www.").unwrap_or(h).to_string()))
        .unwrap_or_default()
}
