//! Inventory fan-out
//!
//! Accounts share nothing, so they are scanned concurrently up to the
//! configured bound. Reports keep inventory order.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{error, info};

use crate::account::Account;
use crate::report::{AccountFailure, InventoryReport};
use crate::scanner::Scanner;

impl Scanner {
    /// Scan every active account of an inventory at `now`
    pub async fn scan_inventory(
        &self,
        accounts: &[Account],
        now: DateTime<Utc>,
        force_rotate: &HashSet<String>,
    ) -> InventoryReport {
        let mut report = InventoryReport::default();
        let mut active = Vec::with_capacity(accounts.len());

        for account in accounts {
            if account.is_active() {
                active.push(account);
            } else {
                info!(
                    account_id = %account.id,
                    status = ?account.status,
                    "Skipping inactive account"
                );
                report.skipped_accounts.push(account.id.clone());
            }
        }

        let results: Vec<_> = stream::iter(active)
            .map(|account| async move {
                (
                    account,
                    self.scan_account(account, now, force_rotate).await,
                )
            })
            .buffered(self.config().concurrency())
            .collect()
            .await;

        for (account, result) in results {
            match result {
                Ok(scan) => report.reports.push(scan),
                Err(err) => {
                    error!(account_id = %account.id, error = %err, "Account scan failed");
                    report.failures.push(AccountFailure {
                        account_id: account.id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            scanned = report.reports.len(),
            failed = report.failures.len(),
            skipped = report.skipped_accounts.len(),
            "Inventory scan complete"
        );
        report
    }
}
