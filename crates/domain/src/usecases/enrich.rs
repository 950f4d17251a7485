//! Enrichment use case - recover missing fields from each article's own page

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::model::{Article, PageMetadata};
use crate::ports::MetadataFetcher;

/// Fills article fields from page metadata
#[derive(Clone)]
pub struct Enricher {
    fetcher: Arc<dyn MetadataFetcher>,
    max_concurrent: usize,
}

impl Enricher {
    pub fn new(fetcher: Arc<dyn MetadataFetcher>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Look up metadata for one URL; any failure means no enrichment
    pub async fn lookup(&self, url: &str) -> Option<PageMetadata> {
        match self.fetcher.fetch_metadata(url).await {
            Ok(metadata) if !metadata.is_empty() => Some(metadata),
            Ok(_) => {
                tracing::debug!(url = %url, "No usable page metadata");
                None
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Enrichment failed");
                None
            }
        }
    }

    /// Enrich a single article; records without a URL pass through untouched
    pub async fn enrich(&self, article: Article) -> Article {
        let Some(url) = article.url().map(str::to_string) else {
            return article;
        };

        match self.lookup(&url).await {
            Some(metadata) => merge(article, metadata),
            None => article,
        }
    }

    /// Enrich every article with bounded concurrency, keeping input order
    pub async fn enrich_all(&self, articles: Vec<Article>) -> Vec<Article> {
        stream::iter(articles)
            .map(|article| self.enrich(article))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }
}

/// Merge page metadata into a record
///
/// A page title replaces the source's title. A page publish time only fills
/// an absent `published_at`. Absent metadata never clears a field.
pub fn merge(mut article: Article, metadata: PageMetadata) -> Article {
    if let Some(title) = metadata.title.filter(|t| !t.trim().is_empty()) {
        article.title = Some(title);
    }

    let has_published = article
        .published_at
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());
    if !has_published {
        if let Some(published) = metadata.published_at.filter(|p| !p.trim().is_empty()) {
            article.published_at = Some(published);
        }
    }

    article
}
