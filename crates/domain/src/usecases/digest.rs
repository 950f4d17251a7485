//! Digest use case - fetch, enrich, aggregate and render every topic, then deliver

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use time::UtcOffset;

use crate::model::{Article, DeliveryOutcome, Digest, TopicResult};
use crate::ports::{Clock, DigestSender};
use crate::usecases::{
    aggregate::aggregate,
    enrich::Enricher,
    fetch::FetchOrchestrator,
    render::{RenderConfig, Renderer},
};

/// Configuration for a digest run
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Topics in the order they appear in the digest
    pub topics: Vec<String>,
    /// Cap on articles fetched per topic
    pub max_results: usize,
    /// Forwarded to the fetch orchestrator
    pub semantic_rerank: bool,
    /// Maximum topics processed at once
    pub max_concurrent: usize,
    /// Recipients of the rendered digest
    pub recipients: Vec<String>,
    /// Render but don't deliver
    pub dry_run: bool,
    /// Render config
    pub render_config: RenderConfig,
    /// Offset the heading date is taken in
    pub utc_offset: UtcOffset,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            topics: vec![],
            max_results: 5,
            semantic_rerank: false,
            max_concurrent: 4,
            recipients: vec![],
            dry_run: true,
            render_config: RenderConfig::default(),
            utc_offset: UtcOffset::UTC,
        }
    }
}

/// Outcome of one digest run
#[derive(Debug)]
pub struct DigestReport {
    pub topics: TopicResult,
    pub digest: Digest,
    pub deliveries: Vec<DeliveryOutcome>,
}

/// Digest pipeline orchestrator
///
/// Owns its collaborators; nothing is looked up globally.
pub struct DigestPipeline<D, Cl>
where
    D: DigestSender + ?Sized,
    Cl: Clock + ?Sized,
{
    orchestrator: FetchOrchestrator,
    enricher: Option<Enricher>,
    sender: Arc<D>,
    clock: Arc<Cl>,
    config: DigestConfig,
}

impl<D, Cl> DigestPipeline<D, Cl>
where
    D: DigestSender + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        orchestrator: FetchOrchestrator,
        enricher: Option<Enricher>,
        sender: Arc<D>,
        clock: Arc<Cl>,
        config: DigestConfig,
    ) -> Self {
        Self {
            orchestrator,
            enricher,
            sender,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Collect, render and deliver one digest for the configured topics
    pub async fn run_once(&self) -> Result<DigestReport, DigestError> {
        if self.config.topics.is_empty() {
            return Err(DigestError::NoTopics);
        }

        tracing::info!(topics = ?self.config.topics, "Starting digest generation");

        let topics = self.collect(&self.config.topics).await;

        tracing::info!(
            topics = topics.len(),
            articles = topics.article_count(),
            "Articles collected"
        );

        let digest = self.render(&topics);
        let deliveries = self.deliver(&digest).await;

        Ok(DigestReport {
            topics,
            digest,
            deliveries,
        })
    }

    /// Fetch, enrich and aggregate each topic
    ///
    /// Topics run concurrently but the result keeps request order. A repeated
    /// topic is processed once, at its first position.
    pub async fn collect(&self, topics: &[String]) -> TopicResult {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = topics
            .iter()
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .collect();

        let per_topic: Vec<(&str, Vec<Article>)> = stream::iter(unique)
            .map(|topic| async move { (topic, self.collect_topic(topic).await) })
            .buffered(self.config.max_concurrent.max(1))
            .collect()
            .await;

        let mut result = TopicResult::new();
        for (topic, articles) in per_topic {
            result.insert(topic, articles);
        }
        result
    }

    /// Fetch, enrich and aggregate a single topic
    pub async fn collect_topic(&self, topic: &str) -> Vec<Article> {
        let fetched = self
            .orchestrator
            .fetch(topic, self.config.max_results, self.config.semantic_rerank)
            .await;

        let fetched_count = fetched.len();

        let enriched = match &self.enricher {
            Some(enricher) => enricher.enrich_all(fetched).await,
            None => fetched,
        };

        let ranked = aggregate(enriched);

        tracing::info!(
            topic = %topic,
            fetched = fetched_count,
            kept = ranked.len(),
            "Topic complete"
        );

        ranked
    }

    /// Render the digest dated with the clock's current day at `utc_offset`
    pub fn render(&self, topics: &TopicResult) -> Digest {
        let renderer = Renderer::new(self.config.render_config.clone());
        let today = self.clock.now().to_offset(self.config.utc_offset).date();
        renderer.render(topics, today)
    }

    /// Send the digest to every recipient; one failure doesn't stop the rest
    pub async fn deliver(&self, digest: &Digest) -> Vec<DeliveryOutcome> {
        if self.config.dry_run {
            tracing::info!(
                recipients = ?self.config.recipients,
                "[DRY RUN] Would deliver digest"
            );
            return vec![];
        }

        if self.config.recipients.is_empty() {
            tracing::warn!("No recipients configured; digest not delivered");
            return vec![];
        }

        let mut outcomes = Vec::with_capacity(self.config.recipients.len());

        for recipient in &self.config.recipients {
            let result = self.sender.send(recipient, digest).await;
            match &result {
                Ok(receipt) => tracing::info!(
                    recipient = %recipient,
                    channel = self.sender.channel(),
                    id = %receipt.id,
                    "Digest delivered"
                ),
                Err(e) => tracing::error!(
                    recipient = %recipient,
                    channel = self.sender.channel(),
                    error = %e,
                    "Digest delivery failed"
                ),
            }
            outcomes.push(DeliveryOutcome {
                recipient: recipient.clone(),
                result,
            });
        }

        outcomes
    }
}

/// Errors from a digest run
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("No topics configured")]
    NoTopics,
}
