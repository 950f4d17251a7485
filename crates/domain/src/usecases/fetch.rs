//! Fetch use case - primary source first, fallbacks when it comes back empty

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::model::Article;
use crate::ports::{ArticleSource, SourceError};

/// Configuration for the fetch orchestrator
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound on a single source call; expiry counts as a source failure
    pub call_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
        }
    }
}

/// Ordered source plan for one topic fetch
///
/// The primary source is tried alone. Only when it fails or returns nothing
/// are the fallbacks queried, concurrently, with their results concatenated
/// in declaration order.
#[derive(Clone)]
pub struct FetchOrchestrator {
    primary: Arc<dyn ArticleSource>,
    fallbacks: Vec<Arc<dyn ArticleSource>>,
    config: FetchConfig,
}

impl FetchOrchestrator {
    pub fn new(
        primary: Arc<dyn ArticleSource>,
        fallbacks: Vec<Arc<dyn ArticleSource>>,
        config: FetchConfig,
    ) -> Self {
        Self {
            primary,
            fallbacks,
            config,
        }
    }

    /// Names of the fallback sources in declaration order
    pub fn fallback_names(&self) -> Vec<&str> {
        self.fallbacks.iter().map(|s| s.name()).collect()
    }

    /// Fetch up to `max_results` records for a topic
    ///
    /// Never fails: every source error degrades that source's contribution to
    /// nothing. `semantic_rerank` is accepted for callers that request it but
    /// does not change the result.
    pub async fn fetch(
        &self,
        topic: &str,
        max_results: usize,
        semantic_rerank: bool,
    ) -> Vec<Article> {
        if semantic_rerank {
            tracing::debug!(topic = %topic, "Semantic rerank requested; keeping source order");
        }

        if max_results == 0 {
            return vec![];
        }

        match self.call(self.primary.as_ref(), topic, max_results).await {
            Ok(mut articles) if !articles.is_empty() => {
                articles.truncate(max_results);
                tracing::info!(
                    topic = %topic,
                    source = %self.primary.name(),
                    count = articles.len(),
                    "Fetched from primary source"
                );
                return articles;
            }
            Ok(_) => {
                tracing::info!(
                    topic = %topic,
                    source = %self.primary.name(),
                    "Primary source returned no articles"
                );
            }
            Err(e) => {
                tracing::warn!(
                    topic = %topic,
                    source = %self.primary.name(),
                    error = %e,
                    "Primary source failed"
                );
            }
        }

        self.fetch_fallbacks(topic, max_results).await
    }

    async fn fetch_fallbacks(&self, topic: &str, max_results: usize) -> Vec<Article> {
        if self.fallbacks.is_empty() {
            return vec![];
        }

        tracing::info!(
            topic = %topic,
            sources = ?self.fallback_names(),
            "Falling back to feed sources"
        );

        // join_all yields results in input order regardless of completion order
        let results = join_all(
            self.fallbacks
                .iter()
                .map(|source| self.call(source.as_ref(), topic, max_results)),
        )
        .await;

        let mut merged = Vec::new();
        for (source, result) in self.fallbacks.iter().zip(results) {
            match result {
                Ok(mut articles) => {
                    articles.truncate(max_results);
                    tracing::debug!(
                        topic = %topic,
                        source = %source.name(),
                        count = articles.len(),
                        "Fallback source contributed"
                    );
                    merged.extend(articles);
                }
                Err(e) => {
                    tracing::warn!(
                        topic = %topic,
                        source = %source.name(),
                        error = %e,
                        "Fallback source failed"
                    );
                }
            }
        }

        merged.truncate(max_results);
        merged
    }

    async fn call(
        &self,
        source: &dyn ArticleSource,
        topic: &str,
        count: usize,
    ) -> Result<Vec<Article>, SourceError> {
        match tokio::time::timeout(self.config.call_timeout, source.fetch(topic, count)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        name: &'static str,
        articles: Vec<Article>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn with_articles(name: &'static str, articles: Vec<Article>) -> Self {
            Self {
                name,
                articles,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ArticleSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _topic: &str, _count: usize) -> Result<Vec<Article>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.articles.clone())
        }
    }

    struct FailingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ArticleSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _topic: &str, _count: usize) -> Result<Vec<Article>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Network("connection refused".to_string()))
        }
    }

    struct SlowSource {
        delay: Duration,
        articles: Vec<Article>,
    }

    #[async_trait]
    impl ArticleSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch(&self, _topic: &str, _count: usize) -> Result<Vec<Article>, SourceError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.articles.clone())
        }
    }

    fn articles(prefix: &str, n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article::new(format!("{prefix} {i}"), format!("https://{prefix}/{i}")))
            .collect()
    }

    fn fake(name: &'static str, articles: Vec<Article>) -> Arc<dyn ArticleSource> {
        Arc::new(FakeSource::with_articles(name, articles))
    }

    fn slow(delay_secs: u64, articles: Vec<Article>) -> Arc<dyn ArticleSource> {
        Arc::new(SlowSource {
            delay: Duration::from_secs(delay_secs),
            articles,
        })
    }

    fn failing() -> (Arc<dyn ArticleSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(FailingSource {
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }

    fn urls(articles: &[Article]) -> Vec<&str> {
        articles.iter().filter_map(|a| a.url()).collect()
    }

    #[tokio::test]
    async fn test_primary_short_circuits_fallbacks() {
        let primary = fake("primary", articles("p", 5));
        let (fallback, fallback_calls) = failing();

        let orchestrator =
            FetchOrchestrator::new(primary, vec![fallback], FetchConfig::default());

        let result = orchestrator.fetch("rust", 3, false).await;

        assert_eq!(urls(&result), vec!["https://p/0", "https://p/1", "https://p/2"]);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallbacks_used_when_primary_fails() {
        let (primary, primary_calls) = failing();
        let feed_a = fake("feed_a", articles("a", 2));
        let feed_b = fake("feed_b", articles("b", 2));

        let orchestrator =
            FetchOrchestrator::new(primary, vec![feed_a, feed_b], FetchConfig::default());

        let result = orchestrator.fetch("rust", 3, false).await;

        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(urls(&result), vec!["https://a/0", "https://a/1", "https://b/0"]);
    }

    #[tokio::test]
    async fn test_fallbacks_used_when_primary_empty() {
        let primary = fake("primary", vec![]);
        let feed = fake("feed", articles("f", 1));

        let orchestrator = FetchOrchestrator::new(primary, vec![feed], FetchConfig::default());

        let result = orchestrator.fetch("rust", 5, false).await;

        assert_eq!(urls(&result), vec!["https://f/0"]);
    }

    #[tokio::test]
    async fn test_each_fallback_capped_before_merge() {
        let (primary, _) = failing();
        let feed_a = fake("feed_a", articles("a", 5));
        let feed_b = fake("feed_b", articles("b", 5));

        let orchestrator =
            FetchOrchestrator::new(primary, vec![feed_a, feed_b], FetchConfig::default());

        let result = orchestrator.fetch("rust", 2, false).await;

        // feed_a alone fills the cap; feed_b's records never make it
        assert_eq!(urls(&result), vec!["https://a/0", "https://a/1"]);
    }

    #[tokio::test]
    async fn test_failing_fallback_does_not_block_others() {
        let (primary, _) = failing();
        let (broken, broken_calls) = failing();
        let feed = fake("feed", articles("f", 2));

        let orchestrator =
            FetchOrchestrator::new(primary, vec![broken, feed], FetchConfig::default());

        let result = orchestrator.fetch("rust", 5, false).await;

        assert_eq!(broken_calls.load(Ordering::SeqCst), 1);
        assert_eq!(urls(&result), vec!["https://f/0", "https://f/1"]);
    }

    #[tokio::test]
    async fn test_total_failure_is_empty_not_error() {
        let (primary, _) = failing();
        let (broken, _) = failing();

        let orchestrator = FetchOrchestrator::new(primary, vec![broken], FetchConfig::default());

        assert!(orchestrator.fetch("rust", 5, false).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_primary_times_out_into_fallback() {
        let primary = slow(60, articles("p", 1));
        let feed = fake("feed", articles("f", 1));

        let orchestrator = FetchOrchestrator::new(
            primary,
            vec![feed],
            FetchConfig {
                call_timeout: Duration::from_secs(10),
            },
        );

        let result = orchestrator.fetch("rust", 5, false).await;

        assert_eq!(urls(&result), vec!["https://f/0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_order_independent_of_completion_order() {
        let (primary, _) = failing();
        let slow_first = slow(5, articles("slow", 1));
        let fast_second = fake("fast", articles("fast", 1));

        let orchestrator = FetchOrchestrator::new(
            primary,
            vec![slow_first, fast_second],
            FetchConfig::default(),
        );

        let result = orchestrator.fetch("rust", 5, false).await;

        assert_eq!(urls(&result), vec!["https://slow/0", "https://fast/0"]);
    }

    #[tokio::test]
    async fn test_semantic_rerank_flag_is_a_no_op() {
        let primary = fake("primary", articles("p", 3));
        let orchestrator = FetchOrchestrator::new(primary, vec![], FetchConfig::default());

        let plain = orchestrator.fetch("rust", 3, false).await;
        let reranked = orchestrator.fetch("rust", 3, true).await;

        assert_eq!(plain, reranked);
    }

    #[tokio::test]
    async fn test_zero_cap_skips_sources() {
        let primary = FakeSource::with_articles("primary", articles("p", 3));
        let calls = Arc::clone(&primary.calls);
        let orchestrator =
            FetchOrchestrator::new(Arc::new(primary), vec![], FetchConfig::default());

        assert!(orchestrator.fetch("rust", 0, false).await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
