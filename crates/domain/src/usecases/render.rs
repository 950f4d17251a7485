//! Rendering use case - transforms ranked articles per topic into a digest document

use time::Date;
use time::macros::format_description;

use crate::model::{Article, Digest, DigestFormat, TopicResult};

/// Notice shown for a topic with nothing to report
pub const NO_ARTICLES_NOTICE: &str = "No articles found today.";

/// Configuration for the renderer
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output format
    pub format: DigestFormat,
    /// Subject line handed to the delivery channel
    pub subject: String,
    /// Link text under each article
    pub link_text: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: DigestFormat::Html,
            subject: "Your Daily BytePress Digest".to_string(),
            link_text: "Read more".to_string(),
        }
    }
}

/// Renderer for digest documents
///
/// Pure transform: every topic in the result gets a section, in result order.
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a digest in the configured format
    pub fn render(&self, result: &TopicResult, date: Date) -> Digest {
        let body = match self.config.format {
            DigestFormat::Html => self.render_html(result, date),
            DigestFormat::Text => self.render_text(result, date),
        };

        Digest {
            subject: self.config.subject.clone(),
            format: self.config.format,
            body,
        }
    }

    /// Render as an HTML fragment suitable for a mail body
    pub fn render_html(&self, result: &TopicResult, date: Date) -> String {
        let mut html = vec![format!(
            "<h2>📰 Daily Digest - {}</h2>",
            escape_html(&format_date(date))
        )];

        for entry in result.iter() {
            html.push(format!("<h3>{}</h3>", escape_html(&entry.topic)));

            if entry.articles.is_empty() {
                html.push(format!("<p>{}</p>", NO_ARTICLES_NOTICE));
                continue;
            }

            for article in &entry.articles {
                html.push(self.format_html_article(article));
            }
        }

        html.join("\n")
    }

    /// Render as plain text
    pub fn render_text(&self, result: &TopicResult, date: Date) -> String {
        let heading = format!("Daily Digest - {}", format_date(date));
        let mut lines = vec![heading.clone(), "=".repeat(heading.chars().count())];

        for entry in result.iter() {
            lines.push(String::new());
            lines.push(format!("## {}", entry.topic));

            if entry.articles.is_empty() {
                lines.push(NO_ARTICLES_NOTICE.to_string());
                continue;
            }

            for article in &entry.articles {
                lines.push(String::new());
                lines.push(format!("* {}", title_of(article)));
                let description = description_of(article);
                if !description.is_empty() {
                    lines.push(format!("  {}", description));
                }
                lines.push(format!("  {}: {}", self.config.link_text, url_of(article)));
            }
        }

        lines.join("\n")
    }

    fn format_html_article(&self, article: &Article) -> String {
        format!(
            "<p>\n    <strong>{}</strong><br>\n    {}<br>\n    <a href=\"{}\">{}</a>\n</p>\n<hr>",
            escape_html(title_of(article)),
            escape_html(description_of(article)),
            escape_html(url_of(article)),
            escape_html(&self.config.link_text),
        )
    }
}

fn title_of(article: &Article) -> &str {
    article.title().unwrap_or_default()
}

fn url_of(article: &Article) -> &str {
    article.url().unwrap_or_default()
}

fn description_of(article: &Article) -> &str {
    article.description.as_deref().unwrap_or_default().trim()
}

/// Long date used in digest headings, e.g. "January 02, 2024"
pub fn format_date(date: Date) -> String {
    let format = format_description!("[month repr:long] [day], [year]");
    date.format(format).unwrap_or_else(|_| date.to_string())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
