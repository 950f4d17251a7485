//! Run command - build one digest and deliver it

use anyhow::{Context, Result, bail};
use bytepress_adapters::outbox::OutboxSender;
use bytepress_adapters::stub::StubDigestSender;
use bytepress_domain::usecases::{DigestConfig, DigestPipeline, DigestReport, RenderConfig};
use bytepress_domain::{DigestSender, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::RunArgs;
use crate::config::AppConfig;
use crate::wiring::{build_enricher, build_orchestrator};

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let topics = if args.topics.is_empty() {
        config.digest.topics.clone()
    } else {
        args.topics.clone()
    };
    if topics.is_empty() {
        bail!("No topics to report on. Pass --topic or set digest.topics in the config.");
    }

    let recipients = if args.recipients.is_empty() {
        config.delivery.recipients.clone()
    } else {
        args.recipients.clone()
    };

    let dry_run = !args.deliver && (args.dry_run || config.general.dry_run);
    let outbox_path = args
        .outbox
        .clone()
        .unwrap_or_else(|| config.delivery.outbox_path.clone());

    let digest_config = DigestConfig {
        topics,
        max_results: args.max_results.unwrap_or(config.general.max_results),
        semantic_rerank: args.semantic_rerank || config.general.semantic_rerank,
        max_concurrent: config.general.max_concurrent,
        recipients,
        dry_run,
        render_config: RenderConfig {
            format: args.format.map(Into::into).unwrap_or(config.digest.format),
            subject: config.digest.subject.clone(),
            ..Default::default()
        },
        utc_offset: config.digest.utc_offset()?,
    };

    tracing::info!(
        dry_run = dry_run,
        topics = ?digest_config.topics,
        max_results = digest_config.max_results,
        format = digest_config.render_config.format.as_str(),
        provider = ?config.sources.provider,
        "Starting bytepress run"
    );

    let orchestrator = build_orchestrator(&config)?;
    let enricher = build_enricher(&config, args.enrich || config.enrich.enabled)?;

    // Dry runs never touch the outbox
    let sender: Arc<dyn DigestSender> = if dry_run {
        Arc::new(StubDigestSender::new())
    } else {
        let outbox = OutboxSender::open(&outbox_path)
            .await
            .with_context(|| format!("Failed to open outbox {}", outbox_path.display()))?;
        tracing::info!(outbox = %outbox.path().display(), "Delivering to outbox");
        Arc::new(outbox)
    };

    let pipeline = DigestPipeline::new(
        orchestrator,
        enricher,
        sender,
        Arc::new(SystemClock),
        digest_config,
    );

    let report = pipeline.run_once().await?;

    if dry_run {
        println!("{}", report.digest.body);
        return Ok(());
    }

    print_deliveries(&report);

    let failed = report.deliveries.iter().filter(|d| !d.is_success()).count();
    if failed > 0 && failed == report.deliveries.len() {
        bail!("All {} deliveries failed", failed);
    }

    tracing::info!("bytepress run completed");
    Ok(())
}

fn print_deliveries(report: &DigestReport) {
    if report.deliveries.is_empty() {
        println!("No recipients configured; digest not delivered");
        return;
    }

    for outcome in &report.deliveries {
        match &outcome.result {
            Ok(receipt) => println!("✓ {} ({})", outcome.recipient, receipt.id),
            Err(e) => println!("✗ {}: {}", outcome.recipient, e),
        }
    }
}
