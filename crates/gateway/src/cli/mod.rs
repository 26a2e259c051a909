//! Command-line interface.

pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lf_domain::config::Config;

#[derive(Parser, Debug)]
#[command(name = "leadflow", about = "CRM assistant gateway", version)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP gateway (default).
    Serve,
    /// Inspect or validate configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print the version and exit.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML.
    Show,
    /// Check the configuration for missing required settings.
    Validate,
}

/// Resolve the config file: `--config`, then `LEADFLOW_CONFIG`, then
/// `config.toml` in the working directory, then built-in defaults.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("LEADFLOW_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    if path.exists() {
        let raw = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    } else {
        tracing::debug!(path = %path.display(), "config file missing, using defaults");
        Ok(Config::default())
    }
}
