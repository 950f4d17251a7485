//! Configuration loading and management

use anyhow::{Context, Result, bail};
use bytepress_adapters::feeds::{FeedSpec, QUERY_PLACEHOLDER};
use bytepress_adapters::newsapi::DEFAULT_BASE_URL;
use bytepress_domain::DigestFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const UTC_OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub digest: DigestSection,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub enrich: EnrichConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub semantic_rerank: bool,

    #[serde(default = "default_true")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestSection {
    #[serde(default)]
    pub topics: Vec<String>,

    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default)]
    pub format: DigestFormat,

    /// Offset the heading date is taken in, e.g. "+02:00"
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

/// Which article sources a run uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceProvider {
    /// Search API first, feeds as fallbacks
    #[default]
    Live,
    /// Offline sources with canned records for the `rust` topic
    Stub,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub provider: SourceProvider,

    #[serde(default)]
    pub newsapi: NewsApiConfig,

    /// Fallback feeds, consulted in this order
    #[serde(default = "FeedSpec::defaults")]
    pub feeds: Vec<FeedSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiConfig {
    #[serde(default = "default_news_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_news_api_base_url")]
    pub base_url: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub recipients: Vec<String>,

    #[serde(default = "default_outbox_path")]
    pub outbox_path: PathBuf,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_results() -> usize {
    5
}

fn default_max_concurrent() -> usize {
    4
}

fn default_request_timeout() -> u64 {
    10
}

fn default_subject() -> String {
    "Your Daily BytePress Digest".to_string()
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_news_api_key_env() -> String {
    "NEWS_API_KEY".to_string()
}

fn default_news_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_window_hours() -> u32 {
    24
}

fn default_outbox_path() -> PathBuf {
    PathBuf::from("./outbox.jsonl")
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_results: default_max_results(),
            max_concurrent: default_max_concurrent(),
            request_timeout_secs: default_request_timeout(),
            semantic_rerank: false,
            dry_run: default_true(),
        }
    }
}

impl Default for DigestSection {
    fn default() -> Self {
        Self {
            topics: vec![],
            subject: default_subject(),
            format: DigestFormat::default(),
            utc_offset: default_utc_offset(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            provider: SourceProvider::default(),
            newsapi: NewsApiConfig::default(),
            feeds: FeedSpec::defaults(),
        }
    }
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_news_api_key_env(),
            base_url: default_news_api_base_url(),
            language: default_language(),
            window_hours: default_window_hours(),
        }
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            recipients: vec![],
            outbox_path: default_outbox_path(),
        }
    }
}

impl DigestSection {
    pub fn utc_offset(&self) -> Result<UtcOffset> {
        UtcOffset::parse(self.utc_offset.trim(), UTC_OFFSET_FORMAT).with_context(|| {
            format!(
                "digest.utc_offset must look like +02:00, got '{}'",
                self.utc_offset
            )
        })
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            bail!("Config file not found: {}", path.display());
        }

        // BYTEPRESS__DIGEST__TOPICS="a,b" style overrides
        builder = builder.add_source(
            config::Environment::with_prefix("BYTEPRESS")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("digest.topics")
                .with_list_parse_key("delivery.recipients"),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.general.request_timeout_secs == 0 {
            bail!("general.request_timeout_secs must be greater than 0");
        }

        self.digest.utc_offset()?;

        for feed in &self.sources.feeds {
            if !feed.url_template.contains(QUERY_PLACEHOLDER) {
                bail!(
                    "Feed '{}' url_template must contain {}",
                    feed.name,
                    QUERY_PLACEHOLDER
                );
            }
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# bytepress configuration

[general]
log_level = "info"
max_results = 5
max_concurrent = 4
request_timeout_secs = 10
semantic_rerank = false
dry_run = true

[digest]
topics = ["gut health", "football"]
subject = "Your Daily BytePress Digest"
format = "html"  # html, text
utc_offset = "+00:00"  # offset for the heading date

[sources]
provider = "live"  # live, stub

[sources.newsapi]
api_key_env = "NEWS_API_KEY"
base_url = "https://newsapi.org"
language = "en"
window_hours = 24

# Fallback feeds, consulted in order when the search API returns nothing
[[sources.feeds]]
name = "google-news"
url_template = "https://news.google.com/rss/search?q={query}+when:1d&hl=en-US&gl=US&ceid=US:en"
fallback_label = "Google News"

[[sources.feeds]]
name = "bing-news"
url_template = "https://www.bing.com/news/search?q={query}&format=RSS"
fallback_label = "Bing News"

[enrich]
enabled = false
max_concurrent = 4

[delivery]
recipients = ["you@example.com"]
outbox_path = "./outbox.jsonl"
"#
        .to_string()
    }
}
