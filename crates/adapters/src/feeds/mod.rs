//! RSS / Atom feed sources
//!
//! Feed endpoints are described by a URL template with a `{query}`
//! placeholder, so any search feed can be configured as a fallback.

mod parse;

pub use parse::parse_feed;

use async_trait::async_trait;
use bytepress_domain::{Article, ArticleSource, SourceError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Placeholder replaced with the URL-encoded topic
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Description of one feed endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSpec {
    /// Short label used in logs
    pub name: String,
    /// Endpoint URL containing `{query}`
    pub url_template: String,
    /// Source label for entries that don't name their publisher
    pub fallback_label: String,
}

impl FeedSpec {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        fallback_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            fallback_label: fallback_label.into(),
        }
    }

    pub fn google_news() -> Self {
        Self::new(
            "google-news",
            "https://news.google.com/rss/search?q={query}+when:1d&hl=en-US&gl=US&ceid=US:en",
            "Google News",
        )
    }

    pub fn bing_news() -> Self {
        Self::new(
            "bing-news",
            "https://www.bing.com/news/search?q={query}&format=RSS",
            "Bing News",
        )
    }

    /// Default fallback chain, in the order it is consulted
    pub fn defaults() -> Vec<Self> {
        vec![Self::google_news(), Self::bing_news()]
    }

    /// Endpoint URL for a topic
    pub fn url_for(&self, topic: &str) -> String {
        self.url_template
            .replace(QUERY_PLACEHOLDER, &urlencoding::encode(topic))
    }
}

/// Article source backed by one feed endpoint
pub struct FeedSource {
    client: Client,
    spec: FeedSpec,
}

impl FeedSource {
    pub fn new(client: Client, spec: FeedSpec) -> Result<Self, SourceError> {
        if !spec.url_template.contains(QUERY_PLACEHOLDER) {
            return Err(SourceError::Config(format!(
                "feed '{}' url_template has no {} placeholder",
                spec.name, QUERY_PLACEHOLDER
            )));
        }
        Ok(Self { client, spec })
    }

    pub fn spec(&self) -> &FeedSpec {
        &self.spec
    }
}

#[async_trait]
impl ArticleSource for FeedSource {
    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn fetch(&self, topic: &str, count: usize) -> Result<Vec<Article>, SourceError> {
        let url = self.spec.url_for(topic);

        tracing::info!(feed = %self.spec.name, topic = %topic, "Fetching feed");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let articles = parse_feed(&body, &self.spec.fallback_label, count)?;

        tracing::debug!(
            feed = %self.spec.name,
            topic = %topic,
            count = articles.len(),
            "Feed returned articles"
        );

        Ok(articles)
    }
}
