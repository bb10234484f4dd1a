//! keycycle - access-key lifecycle scans
//!
//! Evaluates credential records, scans inventory snapshots and prints the
//! effective configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;
mod config;

use commands::evaluate::EvaluateArgs;
use commands::scan::ScanArgs;
use config::AppConfig;

/// keycycle - access-key lifecycle scans
#[derive(Parser, Debug)]
#[command(name = "keycycle")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "KEYCYCLE_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overrides the configuration and KEYCYCLE_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the actions due for one identity's keys
    Evaluate(EvaluateArgs),

    /// Scan every account of an inventory snapshot
    Scan(ScanArgs),

    /// Print the effective configuration as TOML
    Config,

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(
    config: &AppConfig,
    level_flag: Option<&str>,
) -> Result<keycycle_log::LoggerGuard> {
    let mut log = config.log.clone();

    if keycycle_log::Config::env_has_level() {
        log.level = keycycle_log::Config::from_env().level;
    }
    if let Some(format) = std::env::var(keycycle_log::FORMAT_VAR)
        .ok()
        .and_then(|f| f.parse().ok())
    {
        log.format = format;
    }
    if let Some(level) = level_flag {
        log.level = level.to_string();
    }

    keycycle_log::init_with(log).context("Failed to initialize logging")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        commands::completions::run(shell, &mut Cli::command());
        return Ok(());
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    let _log = init_logging(&config, cli.log_level.as_deref())?;

    match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run(&args, &config),
        Commands::Scan(args) => commands::scan::run(&args, config).await,
        Commands::Config => commands::config::run(&config),
        Commands::Completions { .. } => Ok(()),
    }
}
