//! Adapter construction shared by the commands

use anyhow::{Context, Result, bail};
use bytepress_adapters::feeds::FeedSource;
use bytepress_adapters::metadata::HtmlMetadataFetcher;
use bytepress_adapters::newsapi::NewsApiSource;
use bytepress_adapters::stub::{StubArticleSource, StubMetadataFetcher};
use bytepress_domain::usecases::{Enricher, FetchConfig, FetchOrchestrator};
use bytepress_domain::{ArticleSource, MetadataFetcher, SystemClock};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, SourceProvider};

pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No API key env var configured for provider {}", provider);
    }

    let key = std::env::var(env_var).with_context(|| {
        format!(
            "Missing API key env var {} for provider {}",
            env_var, provider
        )
    })?;

    if key.trim().is_empty() {
        bail!(
            "API key env var {} is empty for provider {}",
            env_var,
            provider
        );
    }

    Ok(SecretString::new(key.into()))
}

fn request_timeout(config: &AppConfig) -> Duration {
    Duration::from_secs(config.general.request_timeout_secs)
}

fn http_client(config: &AppConfig) -> Result<reqwest::Client> {
    bytepress_adapters::http_client(request_timeout(config))
        .context("Failed to build HTTP client")
}

/// Primary source plus fallbacks in configured order
pub(crate) fn build_orchestrator(config: &AppConfig) -> Result<FetchOrchestrator> {
    let fetch_config = FetchConfig {
        call_timeout: request_timeout(config),
    };

    if config.sources.provider == SourceProvider::Stub {
        tracing::info!("Using stub article sources");
        let primary: Arc<dyn ArticleSource> = Arc::new(StubArticleSource::sample("stub"));
        return Ok(FetchOrchestrator::new(primary, vec![], fetch_config));
    }

    let client = http_client(config)?;
    let newsapi = &config.sources.newsapi;
    let api_key = load_api_key(&newsapi.api_key_env, "newsapi")?;

    let primary: Arc<dyn ArticleSource> = Arc::new(
        NewsApiSource::new(client.clone(), api_key, Arc::new(SystemClock))
            .context("Failed to initialize news API source")?
            .with_base_url(&newsapi.base_url)
            .with_language(&newsapi.language)
            .with_window_hours(newsapi.window_hours),
    );

    let mut fallbacks: Vec<Arc<dyn ArticleSource>> = Vec::new();
    for spec in &config.sources.feeds {
        let source = FeedSource::new(client.clone(), spec.clone())
            .with_context(|| format!("Failed to initialize feed {}", spec.name))?;
        fallbacks.push(Arc::new(source));
    }

    let orchestrator = FetchOrchestrator::new(primary, fallbacks, fetch_config);
    tracing::debug!(fallbacks = ?orchestrator.fallback_names(), "Sources ready");

    Ok(orchestrator)
}

/// Metadata enricher, or `None` when enrichment is off
pub(crate) fn build_enricher(config: &AppConfig, enabled: bool) -> Result<Option<Enricher>> {
    if !enabled {
        return Ok(None);
    }

    let fetcher: Arc<dyn MetadataFetcher> = match config.sources.provider {
        SourceProvider::Stub => Arc::new(StubMetadataFetcher::new()),
        SourceProvider::Live => Arc::new(HtmlMetadataFetcher::new(http_client(config)?)),
    };

    Ok(Some(Enricher::new(fetcher, config.enrich.max_concurrent)))
}
