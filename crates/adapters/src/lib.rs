//! bytepress adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `newsapi`: Primary JSON search API source
//! - `feeds`: RSS / Atom feed sources used as fallbacks
//! - `metadata`: Article page metadata fetcher
//! - `outbox`: JSONL outbox delivery channel
//! - `stub`: Offline sources and senders

pub mod feeds;
pub mod metadata;
pub mod newsapi;
pub mod outbox;
pub mod stub;

use std::time::Duration;

/// User agent sent with every outbound request
pub const USER_AGENT: &str = concat!("bytepress/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client with a per-request timeout
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Re-exports for article sources
pub mod sources {
    pub use crate::feeds::{FeedSource, FeedSpec};
    pub use crate::newsapi::NewsApiSource;
    pub use crate::stub::StubArticleSource;
}
