//! `keycycle scan`: scan an inventory snapshot
//!
//! The snapshot is loaded into the in-memory store, so enforce mode only
//! changes what `--output` writes back.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use keycycle_scan::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::{parse_instant, print_json, read_json, write_json};
use crate::config::AppConfig;

/// Scan every account of an inventory snapshot
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// JSON inventory snapshot
    #[arg(short, long)]
    pub inventory: PathBuf,

    /// Scan instant (RFC 3339), defaults to the current time
    #[arg(long, value_parser = parse_instant)]
    pub now: Option<DateTime<Utc>>,

    /// Decide and notify without changing any key
    #[arg(long)]
    pub dry_run: bool,

    /// Identity whose keys are rotated regardless of age (repeatable)
    #[arg(long = "force-rotate", value_name = "IDENTITY")]
    pub force_rotate: Vec<String>,

    /// Write the snapshot after execution to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the notification payloads to this file
    #[arg(long)]
    pub notifications: Option<PathBuf>,
}

pub async fn run(args: &ScanArgs, mut config: AppConfig) -> Result<()> {
    if args.dry_run {
        config.scan.dry_run = true;
    }

    let inventory: InventorySnapshot = read_json(&args.inventory)?;
    let store = Arc::new(MemoryStore::from_inventory(&inventory));
    let notifier = Arc::new(MemoryNotifier::new());
    let exemptions =
        StaticExemptions::from_inventory(config.scan.exempt_identities.iter().cloned(), &inventory);

    let scanner = Scanner::new(
        store.clone(),
        Arc::new(MemorySecretSink::new()),
        Arc::new(exemptions),
        notifier.clone(),
    )
    .with_policy(config.policy)
    .with_config(config.scan);

    let now = args.now.unwrap_or_else(Utc::now);
    let force: HashSet<String> = args.force_rotate.iter().cloned().collect();
    info!(
        accounts = inventory.accounts.len(),
        dry_run = scanner.config().dry_run,
        forced = force.len(),
        "Scanning inventory"
    );

    let report = scanner
        .scan_inventory(&inventory.accounts(), now, &force)
        .await;
    if !report.failures.is_empty() {
        warn!(failed = report.failures.len(), "Some accounts could not be scanned");
    }

    if let Some(path) = &args.output {
        write_json(path, &store.export(&inventory))?;
    }
    if let Some(path) = &args.notifications {
        write_json(path, &notifier.sent())?;
    }

    print_json(&report)
}
