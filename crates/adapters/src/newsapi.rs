//! Primary search API source (NewsAPI-compatible `/v2/everything`)

use async_trait::async_trait;
use bytepress_domain::{Article, ArticleSource, Clock, SourceError, UNKNOWN_SOURCE};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// The API rejects page sizes above this
const MAX_PAGE_SIZE: usize = 100;

const WINDOW_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Search API source for the most popular recent articles on a topic
pub struct NewsApiSource {
    client: Client,
    api_key: SecretString,
    base_url: String,
    language: String,
    window: time::Duration,
    clock: Arc<dyn Clock>,
}

impl NewsApiSource {
    /// Create a source; an empty key is rejected before any request is made
    pub fn new(
        client: Client,
        api_key: SecretString,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SourceError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(SourceError::Config("news API key is empty".to_string()));
        }

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "en".to_string(),
            window: time::Duration::hours(24),
            clock,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_window_hours(mut self, hours: u32) -> Self {
        self.window = time::Duration::hours(i64::from(hours.max(1)));
        self
    }

    /// `from` and `to` bounds of the search window, ending now
    fn window_bounds(&self) -> Result<(String, String), SourceError> {
        let to = self.clock.now().to_offset(time::UtcOffset::UTC);
        let from = to - self.window;
        Ok((format_window(from)?, format_window(to)?))
    }
}

fn format_window(at: OffsetDateTime) -> Result<String, SourceError> {
    at.format(WINDOW_FORMAT)
        .map_err(|e| SourceError::Config(format!("cannot format search window: {}", e)))
}

fn request_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Network(error.to_string())
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    title: Option<String>,
    url: Option<String>,
    source: Option<ApiSource>,
    published_at: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl From<ApiArticle> for Article {
    fn from(api: ApiArticle) -> Self {
        Article {
            title: api.title,
            url: api.url,
            source: api
                .source
                .and_then(|s| s.name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            published_at: api.published_at,
            description: api.description,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn fetch(&self, topic: &str, count: usize) -> Result<Vec<Article>, SourceError> {
        let (from, to) = self.window_bounds()?;
        let page_size = count.clamp(1, MAX_PAGE_SIZE).to_string();
        let url = format!("{}/v2/everything", self.base_url);

        tracing::info!(
            topic = %topic,
            count = count,
            from = %from,
            to = %to,
            "Querying news API"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", topic),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("language", self.language.as_str()),
                ("sortBy", "popularity"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(SourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if body.status.as_deref() == Some("error") {
            return Err(SourceError::Parse(
                body.message
                    .unwrap_or_else(|| "API reported an error".to_string()),
            ));
        }

        let mut articles: Vec<Article> = body.articles.into_iter().map(Article::from).collect();
        articles.truncate(count);

        tracing::debug!(topic = %topic, count = articles.len(), "News API returned articles");

        Ok(articles)
    }
}
