//! RSS / Atom parsing into canonical articles

use bytepress_domain::{Article, SourceError};
use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use scraper::Html;

/// Parse an RSS or Atom document, keeping at most `limit` entries.
///
/// Entries keep feed order. `fallback_label` names the source of entries
/// that don't carry their own publisher name.
pub fn parse_feed(
    body: &str,
    fallback_label: &str,
    limit: usize,
) -> Result<Vec<Article>, SourceError> {
    let feed = parser::parse(body.as_bytes())
        .map_err(|e| SourceError::Parse(format!("invalid feed: {}", e)))?;

    tracing::debug!(entries = feed.entries.len(), "Parsed feed");

    Ok(feed
        .entries
        .into_iter()
        .take(limit)
        .map(|entry| to_article(entry, fallback_label))
        .collect())
}

fn to_article(entry: Entry, fallback_label: &str) -> Article {
    let url = select_link(&entry.links);
    let source = entry
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| is_publisher_name(s))
        .map_or_else(|| fallback_label.to_string(), str::to_string);

    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body));

    Article {
        title: entry.title.map(|t| t.content.trim().to_string()),
        url,
        source,
        published_at: entry.published.or(entry.updated).map(|d| d.to_rfc3339()),
        description: summary.map(|s| plain_text(&s)).filter(|s| !s.is_empty()),
    }
}

/// The alternate link when there is one, otherwise the first non-empty href
fn select_link(links: &[Link]) -> Option<String> {
    let usable = || links.iter().filter(|l| !l.href.trim().is_empty());
    usable()
        .find(|l| {
            l.rel
                .as_deref()
                .is_none_or(|rel| rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
        })
        .or_else(|| usable().next())
        .map(|l| l.href.trim().to_string())
}

/// RSS `<source>` may surface as the channel URL; only a name labels the record
fn is_publisher_name(value: &str) -> bool {
    !value.is_empty() && !value.starts_with("http://") && !value.starts_with("https://")
}

/// Feed summaries are often HTML snippets; keep only their text
fn plain_text(snippet: &str) -> String {
    let fragment = Html::parse_fragment(snippet);
    let text: Vec<&str> = fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    text.join(" ")
}
