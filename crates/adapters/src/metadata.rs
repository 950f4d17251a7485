//! Article page metadata fetcher

use async_trait::async_trait;
use bytepress_domain::{MetadataError, MetadataFetcher, PageMetadata};
use reqwest::Client;
use scraper::{Html, Selector};

/// Meta tags that carry the publish time, in order of preference
const PUBLISHED_SELECTORS: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="article:published_time"]"#,
    r#"meta[itemprop="datePublished"]"#,
];

/// Fetches an article page and reads its title and publish time
pub struct HtmlMetadataFetcher {
    client: Client,
}

impl HtmlMetadataFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataFetcher for HtmlMetadataFetcher {
    async fn fetch_metadata(&self, url: &str) -> Result<PageMetadata, MetadataError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        extract_metadata(&body)
    }
}

/// Read title and publish time from an HTML document
pub fn extract_metadata(html: &str) -> Result<PageMetadata, MetadataError> {
    let document = Html::parse_document(html);

    let title_selector = selector("title")?;
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let mut published_at = None;
    for css in PUBLISHED_SELECTORS {
        let meta_selector = selector(css)?;
        published_at = document
            .select(&meta_selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|c| !c.is_empty())
            .map(str::to_string);
        if published_at.is_some() {
            break;
        }
    }

    Ok(PageMetadata {
        title,
        published_at,
    })
}

fn selector(css: &str) -> Result<Selector, MetadataError> {
    Selector::parse(css).map_err(|e| MetadataError::Parse(format!("selector {}: {}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <title>
      Probiotics study, full story
    </title>
    <meta property="og:title" content="Ignored">
    <meta property="article:published_time" content="2024-01-02T08:00:00Z">
  </head>
  <body><h1>Probiotics</h1></body>
</html>"#;

    #[test]
    fn test_extract_title_and_published_time() {
        let metadata = extract_metadata(PAGE).unwrap();

        assert_eq!(metadata.title.as_deref(), Some("Probiotics study, full story"));
        assert_eq!(metadata.published_at.as_deref(), Some("2024-01-02T08:00:00Z"));
    }

    #[test]
    fn test_itemprop_fallback() {
        let html = r#"<html><head><title></title></head><body>
            <span itemprop="datePublished" content="2024-01-01"></span>
            <meta itemprop="datePublished" content="2024-01-01">
        </body></html>"#;

        let metadata = extract_metadata(html).unwrap();

        assert!(metadata.title.is_none());
        assert_eq!(metadata.published_at.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_page_without_metadata() {
        let metadata = extract_metadata("<html><body><p>plain</p></body></html>").unwrap();

        assert!(metadata.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_metadata_over_http() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/story"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;

        let fetcher = HtmlMetadataFetcher::new(crate::http_client(Duration::from_secs(5)).unwrap());
        let metadata = fetcher
            .fetch_metadata(&format!("{}/story", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(metadata.title.as_deref(), Some("Probiotics study, full story"));
    }

    #[tokio::test]
    async fn test_fetch_metadata_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = HtmlMetadataFetcher::new(Client::new());
        let result = fetcher
            .fetch_metadata(&format!("{}/gone", mock_server.uri()))
            .await;

        assert!(matches!(result, Err(MetadataError::Http(404))));
    }
}
