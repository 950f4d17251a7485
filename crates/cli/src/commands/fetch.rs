//! Fetch command - ranked articles for one topic

use anyhow::{Result, bail};
use bytepress_domain::Article;
use bytepress_domain::usecases::aggregate;
use std::path::PathBuf;

use crate::args::FetchArgs;
use crate::config::AppConfig;
use crate::wiring::{build_enricher, build_orchestrator};

pub async fn execute(args: FetchArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let topic = args.topic.trim();
    if topic.is_empty() {
        bail!("Topic must not be empty");
    }

    let orchestrator = build_orchestrator(&config)?;
    let enricher = build_enricher(&config, args.enrich || config.enrich.enabled)?;
    let max_results = args.max_results.unwrap_or(config.general.max_results);

    let fetched = orchestrator
        .fetch(topic, max_results, config.general.semantic_rerank)
        .await;
    let fetched = match &enricher {
        Some(enricher) => enricher.enrich_all(fetched).await,
        None => fetched,
    };
    let articles = aggregate(fetched);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&articles)?);
    } else {
        print_articles(topic, &articles);
    }

    Ok(())
}

fn print_articles(topic: &str, articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles found for '{}'", topic);
        return;
    }

    println!("Top {} articles for '{}':", articles.len(), topic);
    for (i, article) in articles.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, article.title().unwrap_or_default());
        println!(
            "   {} | {}",
            article.source,
            article.published_at.as_deref().unwrap_or("undated")
        );
        println!("   {}", article.url().unwrap_or_default());
    }
}
