//! CLI argument definitions

use bytepress_domain::DigestFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bytepress: build a daily news digest for a list of topics
#[derive(Parser, Debug)]
#[command(name = "bytepress")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build one digest and deliver it
    Run(RunArgs),

    /// Fetch and rank articles for a single topic
    Fetch(FetchArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Html,
    Text,
}

impl From<FormatArg> for DigestFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Html => DigestFormat::Html,
            FormatArg::Text => DigestFormat::Text,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Topic to include (repeatable; replaces configured topics)
    #[arg(short, long = "topic")]
    pub topics: Vec<String>,

    /// Maximum articles per topic
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Visit article pages to recover titles and publish times
    #[arg(long)]
    pub enrich: bool,

    /// Request semantic reranking (currently keeps source order)
    #[arg(long)]
    pub semantic_rerank: bool,

    /// Print the digest instead of delivering it
    #[arg(long, conflicts_with = "deliver")]
    pub dry_run: bool,

    /// Deliver even when the config enables dry-run
    #[arg(long)]
    pub deliver: bool,

    /// Recipient (repeatable; replaces configured recipients)
    #[arg(long = "recipient")]
    pub recipients: Vec<String>,

    /// Path to the outbox file
    #[arg(long)]
    pub outbox: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Topic to search for
    #[arg(short, long)]
    pub topic: String,

    /// Maximum articles to return
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Visit article pages to recover titles and publish times
    #[arg(long)]
    pub enrich: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (file plus environment)
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
