//! Domain models and value objects

use serde::{Deserialize, Serialize};

/// Provenance label used when a source does not name the publisher
pub const UNKNOWN_SOURCE: &str = "unknown";

/// The canonical article record every source converges to
///
/// Fields are best-effort: adapters leave whatever their protocol does not
/// expose as `None` and aggregation decides what survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline; required to survive aggregation
    pub title: Option<String>,
    /// Link to the article; unique key, required to survive aggregation
    pub url: Option<String>,
    /// Publisher or feed label
    #[serde(default = "default_source")]
    pub source: String,
    /// Publish time as the source encoded it (ISO-8601, RFC 2822, ...)
    pub published_at: Option<String>,
    /// Short summary
    pub description: Option<String>,
}

fn default_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

impl Article {
    /// Create a record with the mandatory fields set and everything else empty
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
            source: default_source(),
            published_at: None,
            description: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// URL if present and non-blank
    pub fn url(&self) -> Option<&str> {
        non_blank(self.url.as_deref())
    }

    /// Title if present and non-blank
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fields recovered by visiting an article's page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Document title
    pub title: Option<String>,
    /// Value of the published-time metadata tag
    pub published_at: Option<String>,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.published_at.is_none()
    }
}

/// Ranked articles for one requested topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicArticles {
    pub topic: String,
    pub articles: Vec<Article>,
}

/// Articles per topic, in the order the topics were requested
///
/// An empty article list is a normal outcome (every source failed or had
/// nothing); the topic still keeps its slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicResult {
    entries: Vec<TopicArticles>,
}

impl TopicResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a topic's articles; a new topic is appended, an existing one keeps its position
    pub fn insert(&mut self, topic: impl Into<String>, articles: Vec<Article>) {
        let topic = topic.into();
        match self.entries.iter_mut().find(|e| e.topic == topic) {
            Some(entry) => entry.articles = articles,
            None => self.entries.push(TopicArticles { topic, articles }),
        }
    }

    pub fn get(&self, topic: &str) -> Option<&[Article]> {
        self.entries
            .iter()
            .find(|e| e.topic == topic)
            .map(|e| e.articles.as_slice())
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.topic.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicArticles> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of articles across all topics
    pub fn article_count(&self) -> usize {
        self.entries.iter().map(|e| e.articles.len()).sum()
    }
}

/// Output format of a rendered digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DigestFormat {
    #[default]
    Html,
    Text,
}

impl DigestFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestFormat::Html => "html",
            DigestFormat::Text => "text",
        }
    }
}

/// A rendered digest ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub subject: String,
    pub format: DigestFormat,
    pub body: String,
}

/// Delivery outcome for one recipient
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub recipient: String,
    pub result: Result<crate::ports::DeliveryReceipt, crate::ports::DeliveryError>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
