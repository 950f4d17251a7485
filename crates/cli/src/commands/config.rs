//! Config command - configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;

pub async fn execute(args: ConfigArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => init_config(&path, force),
        ConfigCommands::Show => show_config(config_path.as_deref()),
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, AppConfig::example_toml())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    println!("Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit the topics and recipients in the config file");
    println!("  2. Export your search API key (NEWS_API_KEY by default)");
    println!("  3. Run 'bytepress doctor' to validate your setup");
    println!("  4. Run 'bytepress run --dry-run' to preview a digest");

    Ok(())
}

fn show_config(config_path: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
