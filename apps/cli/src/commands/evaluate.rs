//! `keycycle evaluate`: decide actions for one identity

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use keycycle_lifecycle::{CredentialRecord, CredentialSet, evaluate};
use std::path::PathBuf;
use tracing::info;

use super::{parse_instant, print_json, read_json};
use crate::config::AppConfig;

/// Print the actions due for one identity's keys
#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// JSON array with the identity's credential records
    #[arg(short, long)]
    pub input: PathBuf,

    /// Evaluation instant (RFC 3339), defaults to the current time
    #[arg(long, value_parser = parse_instant)]
    pub now: Option<DateTime<Utc>>,

    /// Rotate active keys regardless of age
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &EvaluateArgs, config: &AppConfig) -> Result<()> {
    let records: Vec<CredentialRecord> = read_json(&args.input)?;
    let set = CredentialSet::new(records)
        .with_context(|| format!("Invalid credential set in {}", args.input.display()))?;

    let now = args.now.unwrap_or_else(Utc::now);
    let actions = evaluate(&set, now, args.force, &config.policy);
    info!(
        identity = set.owner().unwrap_or_default(),
        actions = actions.len(),
        "Evaluated credential set"
    );

    print_json(&actions)
}
