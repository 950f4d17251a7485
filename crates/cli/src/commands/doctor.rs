//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::{AppConfig, SourceProvider};

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    topics: CheckResult,
    primary_source: CheckResult,
    feeds: CheckResult,
    delivery: CheckResult,
    overall: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Ok,
    Warn,
    Error,
}

impl Status {
    fn symbol(self) -> &'static str {
        match self {
            Status::Ok => "✓",
            Status::Warn => "⚠",
            Status::Error => "✗",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Error => "ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: Status,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    fn ok(message: impl Into<String>) -> Self {
        Self::new(Status::Ok, message)
    }

    fn warn(message: impl Into<String>) -> Self {
        Self::new(Status::Warn, message)
    }

    fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, message)
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let not_checked = || CheckResult::error("Not checked");
    let mut report = DoctorReport {
        config: not_checked(),
        topics: not_checked(),
        primary_source: not_checked(),
        feeds: not_checked(),
        delivery: not_checked(),
        overall: Status::Error,
    };

    match AppConfig::load(config_path.as_deref()) {
        Ok(config) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            report.topics = check_topics(&config);
            report.primary_source = check_primary_source(&config);
            report.feeds = check_feeds(&config);
            report.delivery = check_delivery(&config);
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
        }
    }

    // Worst individual status wins
    report.overall = [
        &report.config,
        &report.topics,
        &report.primary_source,
        &report.feeds,
        &report.delivery,
    ]
    .iter()
    .map(|c| c.status)
    .max()
    .unwrap_or(Status::Error);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == Status::Error {
        std::process::exit(1);
    }

    Ok(())
}

fn check_topics(config: &AppConfig) -> CheckResult {
    let topics = &config.digest.topics;
    if topics.is_empty() {
        return CheckResult::warn("No topics configured (pass --topic to run)");
    }

    CheckResult::ok(format!(
        "{} topic(s): {}, max {} articles each",
        topics.len(),
        topics.join(", "),
        config.general.max_results
    ))
}

fn check_primary_source(config: &AppConfig) -> CheckResult {
    if config.sources.provider == SourceProvider::Stub {
        return CheckResult::warn("Stub provider: runs use offline sources");
    }

    let newsapi = &config.sources.newsapi;
    if newsapi.api_key_env.trim().is_empty() {
        return CheckResult::error("No API key env var configured for the search API");
    }

    match std::env::var(&newsapi.api_key_env) {
        Ok(val) if !val.trim().is_empty() => CheckResult::ok(format!(
            "Search API: {}, API key: {} (set)",
            newsapi.base_url, newsapi.api_key_env
        )),
        _ => CheckResult::error(format!(
            "Search API: {}, API key: {} (not set)",
            newsapi.base_url, newsapi.api_key_env
        )),
    }
}

fn check_feeds(config: &AppConfig) -> CheckResult {
    if config.sources.provider == SourceProvider::Stub {
        return CheckResult::ok("Stub provider: feeds not used");
    }

    let feeds = &config.sources.feeds;
    if feeds.is_empty() {
        return CheckResult::warn("No fallback feeds configured");
    }

    let names: Vec<&str> = feeds.iter().map(|f| f.name.as_str()).collect();
    CheckResult::ok(format!("Fallback order: {}", names.join(" -> ")))
        .with_details(serde_json::json!(feeds))
}

fn check_delivery(config: &AppConfig) -> CheckResult {
    let delivery = &config.delivery;
    let outbox = delivery.outbox_path.display();

    if config.general.dry_run {
        return CheckResult::ok(format!("Dry run: digests printed, outbox {} unused", outbox));
    }

    if delivery.recipients.is_empty() {
        return CheckResult::warn(format!("No recipients configured (outbox: {})", outbox));
    }

    CheckResult::ok(format!(
        "{} recipient(s), outbox: {}",
        delivery.recipients.len(),
        outbox
    ))
}

fn print_report(report: &DoctorReport) {
    println!("bytepress Doctor Report");
    println!("=======================");
    println!();

    print_check("Config", &report.config);
    print_check("Topics", &report.topics);
    print_check("Primary Source", &report.primary_source);
    print_check("Feeds", &report.feeds);
    print_check("Delivery", &report.delivery);

    println!();
    println!(
        "{} Overall: {}",
        report.overall.symbol(),
        report.overall.label()
    );

    if report.overall == Status::Ok {
        println!();
        println!("Ready to run! Try: bytepress run --dry-run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    println!("{} {}: {}", result.status.symbol(), name, result.message);
}
