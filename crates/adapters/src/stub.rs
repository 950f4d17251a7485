//! Offline adapters for testing, dry runs and `provider = "stub"`

use async_trait::async_trait;
use bytepress_domain::{
    Article, ArticleSource, DeliveryError, DeliveryReceipt, Digest, DigestSender, MetadataError,
    MetadataFetcher, PageMetadata, SourceError,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Stub article source returning canned records
pub struct StubArticleSource {
    name: String,
    articles: HashMap<String, Vec<Article>>,
    default_articles: Vec<Article>,
    fail: bool,
}

impl StubArticleSource {
    /// A source that finds nothing for any topic
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            articles: HashMap::new(),
            default_articles: vec![],
            fail: false,
        }
    }

    /// A source returning the same records for every topic
    pub fn with_articles(name: impl Into<String>, articles: Vec<Article>) -> Self {
        Self {
            default_articles: articles,
            ..Self::empty(name)
        }
    }

    /// Records for one topic; other topics fall back to the shared list
    pub fn with_topic(mut self, topic: impl Into<String>, articles: Vec<Article>) -> Self {
        self.articles.insert(topic.into(), articles);
        self
    }

    /// Offline demo source: canned records for the `rust` topic only
    pub fn sample(name: impl Into<String>) -> Self {
        Self::empty(name).with_topic(SAMPLE_TOPIC, sample_articles())
    }

    /// A source whose every call fails
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::empty(name)
        }
    }
}

/// Topic served by [`StubArticleSource::sample`]
pub const SAMPLE_TOPIC: &str = "rust";

fn sample_articles() -> Vec<Article> {
    vec![
        Article::new(
            "This Week in Rust 587",
            "https://this-week-in-rust.org/blog/2025/02/19/this-week-in-rust-587/",
        )
        .with_source("This Week in Rust")
        .with_published_at("2025-02-19"),
        Article::new(
            "Announcing Rust 1.85.0 and Rust 2024",
            "https://blog.rust-lang.org/2025/02/20/Rust-1.85.0.html",
        )
        .with_source("Rust Blog")
        .with_published_at("2025-02-20T00:00:00Z")
        .with_description("The 2024 edition is now stable."),
    ]
}

#[async_trait]
impl ArticleSource for StubArticleSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, topic: &str, count: usize) -> Result<Vec<Article>, SourceError> {
        if self.fail {
            return Err(SourceError::Network(format!("{} is unavailable", self.name)));
        }

        let articles = self.articles.get(topic).unwrap_or(&self.default_articles);
        Ok(articles.iter().take(count).cloned().collect())
    }
}

/// Metadata fetcher that never finds anything
#[derive(Debug, Default)]
pub struct StubMetadataFetcher {
    metadata: HashMap<String, PageMetadata>,
}

impl StubMetadataFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned metadata for one URL
    pub fn with_page(mut self, url: impl Into<String>, metadata: PageMetadata) -> Self {
        self.metadata.insert(url.into(), metadata);
        self
    }
}

#[async_trait]
impl MetadataFetcher for StubMetadataFetcher {
    async fn fetch_metadata(&self, url: &str) -> Result<PageMetadata, MetadataError> {
        Ok(self.metadata.get(url).cloned().unwrap_or_default())
    }
}

/// Digest sender that keeps deliveries in memory
#[derive(Debug, Default)]
pub struct StubDigestSender {
    delivered: Mutex<Vec<(String, Digest)>>,
}

impl StubDigestSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recipients and digests delivered so far
    pub fn delivered(&self) -> Vec<(String, Digest)> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DigestSender for StubDigestSender {
    async fn send(&self, recipient: &str, digest: &Digest) -> Result<DeliveryReceipt, DeliveryError> {
        let mut delivered = self
            .delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        delivered.push((recipient.to_string(), digest.clone()));

        Ok(DeliveryReceipt {
            id: format!("stub_{}", delivered.len()),
        })
    }

    fn channel(&self) -> &'static str {
        "stub"
    }
}
