//! Action Logging and Execution
//!
//! Execution maps every action to exactly one credential-store effect.
//! A failed action is reported and the next one still runs.

use chrono::{DateTime, Utc};
use keycycle_lifecycle::{Action, ActionKind};
use tracing::{error, info};

use crate::error::ScanResult;
use crate::report::{ActionOutcome, QueuedAction};
use crate::traits::{CredentialStore, SecretSink};

/// Log the queue the way it is about to be (or would be) applied
pub fn log_actions(actions: &[QueuedAction], dry_run: bool) {
    if actions.is_empty() {
        info!("No actions to be taken on this account.");
        return;
    }

    for queued in actions {
        let action = &queued.action;
        let key_id = action.key_id();
        let reason = action.reason.description();

        let line = match (action.kind, dry_run) {
            (ActionKind::Rotate, true) => format!("Would create new key to replace {key_id}"),
            (ActionKind::Rotate, false) => format!("Creating new key to replace {key_id}"),
            (ActionKind::Deactivate, true) => format!("Would deactivate {key_id}"),
            (ActionKind::Deactivate, false) => format!("Deactivating {key_id}"),
            (ActionKind::Delete, true) => format!("Would delete {key_id}"),
            (ActionKind::Delete, false) => format!("Deleting {key_id}"),
            (ActionKind::RotateAndDelete, true) => {
                format!("Would delete {key_id} and create a new key")
            }
            (ActionKind::RotateAndDelete, false) => {
                format!("Deleting {key_id} and creating a new key")
            }
            (ActionKind::Warn { action_date }, _) => {
                format!("Warning for {key_id}, transition at {}", action_date.to_rfc3339())
            }
        };

        info!(identity = action.owner(), "{line} -- {reason}");
    }
}

async fn rotate(
    store: &dyn CredentialStore,
    secrets: &dyn SecretSink,
    account: &str,
    identity: &str,
    now: DateTime<Utc>,
) -> ScanResult<()> {
    let issued = store.issue_credential(account, identity, now).await?;
    info!(identity, key_id = %issued.key_id, "Issued replacement key");
    secrets.publish(account, &issued).await
}

async fn apply(
    store: &dyn CredentialStore,
    secrets: &dyn SecretSink,
    account: &str,
    action: &Action,
    now: DateTime<Utc>,
) -> ScanResult<()> {
    let identity = action.owner();
    let key_id = action.key_id();

    match action.kind {
        ActionKind::Rotate => rotate(store, secrets, account, identity, now).await,
        ActionKind::Deactivate => {
            info!(identity, key_id, "Deactivating key");
            store.deactivate_credential(account, identity, key_id).await
        }
        ActionKind::Delete => {
            info!(identity, key_id, "Deleting key");
            store.delete_credential(account, identity, key_id).await
        }
        ActionKind::RotateAndDelete => {
            info!(identity, key_id, "Deleting key before replacing it");
            store.delete_credential(account, identity, key_id).await?;
            rotate(store, secrets, account, identity, now).await
        }
        ActionKind::Warn { .. } => Ok(()),
    }
}

/// Apply every non-warning action of the queue, in order
///
/// Warnings are not executed and produce no outcome.
pub async fn execute_actions(
    store: &dyn CredentialStore,
    secrets: &dyn SecretSink,
    account: &str,
    actions: &[QueuedAction],
    now: DateTime<Utc>,
) -> Vec<ActionOutcome> {
    let mut outcomes = Vec::new();

    for queued in actions.iter().filter(|q| !q.action.kind.is_warning()) {
        let action = &queued.action;
        let result = apply(store, secrets, account, action, now).await;

        if let Err(err) = &result {
            error!(
                account,
                identity = action.owner(),
                key_id = action.key_id(),
                kind = action.kind.label(),
                error = %err,
                "Action failed"
            );
        }

        outcomes.push(ActionOutcome {
            action: action.clone(),
            error: result.err().map(|err| err.to_string()),
        });
    }

    outcomes
}
