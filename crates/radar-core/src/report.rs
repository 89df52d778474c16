use anyhow::{Context, Result};
use chrono::NaiveDate;
use radar_state::Policy;
use std::path::Path;

use crate::domain::{ScoredCandidate, SelectionResult};

/// Items listed in the TL;DR section.
pub const TLDR_ITEMS: usize = 5;

fn push_item(out: &mut String, item: &ScoredCandidate) {
    let s = &item.scores;
    out.push_str(&format!("- **{}**: {}\n", item.title, item.url));
    out.push_str(&format!(
        "  - Scores: novelty {}/5, relevance {}/5, authority {}/5, impact {}/5 -> **{}**\n",
        s.novelty, s.relevance, s.authority, s.impact, item.total
    ));
    out.push_str(&format!("  - Tags: {}\n", item.tags.join(", ")));
}

/// Render the Markdown radar report.
///
/// Sections: TL;DR with the top items, then one section per requested repo
/// that has selected items (in `repos` order), then any remaining owners
/// such as cross-repo items, in selection order.
pub fn render_report(
    date: NaiveDate,
    policy: &Policy,
    repos: &[String],
    selection: &SelectionResult,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Engineering Radar: {}\n\n", date.format("%Y-%m-%d")));

    out.push_str("## TL;DR\n");
    if selection.is_empty() {
        out.push_str("- No items selected this run.\n");
    }
    for item in selection.iter().take(TLDR_ITEMS) {
        out.push_str(&format!(
            "- **{}**: {} ({}) {}\n",
            item.repo, item.title, item.total, item.url
        ));
    }
    out.push('\n');
    out.push_str("## Per repo\n");

    let mut owners: Vec<&str> = repos.iter().map(String::as_str).collect();
    for item in selection.iter() {
        if !owners.contains(&item.repo.as_str()) {
            owners.push(item.repo.as_str());
        }
    }

    for repo in owners {
        let mut items = selection.for_repo(repo).peekable();
        if items.peek().is_none() {
            continue;
        }
        out.push_str(&format!("\n### {}\n", repo));
        if let Some(purpose) = policy.purpose_of(repo) {
            out.push_str(&format!("- Purpose: {}\n", purpose));
        }
        for item in items {
            push_item(&mut out, item);
        }
    }
    out
}

/// Write the report to `path`.
pub fn write_report(path: &Path, markdown: &str) -> Result<()> {
    std::fs::write(path, markdown).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
