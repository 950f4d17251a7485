//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Article, Digest, PageMetadata};

/// Error type for article source operations
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Malformed payload: {0}")]
    Parse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Port for a single article source (search API, feed endpoint, ...)
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Fetch at most `count` records for a topic, mapped into the canonical shape
    async fn fetch(&self, topic: &str, count: usize) -> Result<Vec<Article>, SourceError>;
}

/// Error type for page metadata lookups
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Http(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Port for recovering article fields from the article's own page
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch_metadata(&self, url: &str) -> Result<PageMetadata, MetadataError>;
}

/// Error type for digest delivery
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Delivery rejected: {0}")]
    Rejected(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result of a successful delivery
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// Channel-specific message ID
    pub id: String,
}

/// Port for handing a rendered digest to a transport
#[async_trait]
pub trait DigestSender: Send + Sync {
    async fn send(&self, recipient: &str, digest: &Digest)
    -> Result<DeliveryReceipt, DeliveryError>;

    /// Get the channel name (e.g., "outbox", "stub")
    fn channel(&self) -> &'static str;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Fixed clock for tests and reproducible runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
