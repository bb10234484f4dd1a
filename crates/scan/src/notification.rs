//! Notification Rendering and Delivery
//!
//! Turns a queue of decided actions into the payload handed to the
//! notification channel. Message wording depends on the action kind, the
//! reason and, for warnings, the whole days left until the transition.

use chrono::{DateTime, Utc};
use keycycle_lifecycle::{Action, ActionKind, ActionReason, PolicyConfig};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::error::ScanResult;
use crate::report::QueuedAction;
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::traits::NotificationSender;

/// Subject line of every notification
pub const SUBJECT: &str = "[IMPORTANT] Access Key Security Violation Detected in your Account.";

const DAY_SECS: i64 = 24 * 3600;

/// Values substituted into the email template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateValues {
    /// Account identifier
    pub account_id: String,
    /// Account display name
    pub account_name: String,
    /// Scan instant, RFC 3339
    pub timestamp: String,
    /// One rendered line per action
    pub actions: Vec<String>,
    /// Policy rotation period in whole days
    pub rotation_period_days: i64,
    /// Policy installation grace in whole days
    pub installation_grace_period_days: i64,
    /// Policy recovery grace in whole days
    pub recovery_grace_period_days: i64,
}

/// A notification ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Recipient address
    pub recipient: String,
    /// Subject line
    pub subject: String,
    /// Template the channel renders the message with
    pub email_template: String,
    /// Template inputs
    pub template_values: TemplateValues,
}

/// Whole days from `now` until `at`, rounded to the nearest day.
/// Exact half days round up.
fn days_until(now: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (at - now).num_seconds().saturating_add(DAY_SECS / 2).div_euclid(DAY_SECS)
}

fn warning_message(action: &Action, days: i64) -> String {
    let key = &action.target;
    match action.reason {
        ActionReason::KeyPendingRotation => format!(
            "WARNING: Key {key} will expire in {days} days and will be rotated.  \
             Please be ready to install the new key."
        ),
        ActionReason::KeyPendingDeactivation => format!(
            "WARNING: Key {key} installation grace period will end in {days} days and \
             will be deactivated.  Please verify the new key is installed."
        ),
        ActionReason::KeyPendingDeletion => format!(
            "WARNING: Key {key} recovery grace period will end in {days} days and will be \
             permanently deleted.  Please verify the new key is installed and working."
        ),
        ActionReason::UnusedKeyPendingDeletion => format!(
            "WARNING: Key {key} will expire in {days} days and has never been used.  \
             Key will be permanently deleted."
        ),
        ActionReason::KeyPendingExpirationConflict => format!(
            "CRITICAL: Key {key} will expire in {days} days and cannot be rotated because \
             another key exists for the user!  It will be permanently deleted when the other \
             key expires or the grace period ends!  Please make sure this key is not being used!"
        ),
        ActionReason::KeyPendingDeletionConflict => format!(
            "CRITICAL: Key {key} will be permanently deleted in {days} days due to a conflict \
             with another key for the user!  It may be deactivated sooner if the grace period \
             ends!  Please make sure this key is not being used!"
        ),
        other => format!("WARNING: Key {key} {}", other.description()),
    }
}

/// Render the notification line for one action
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use keycycle_lifecycle::{Action, ActionReason, CredentialRecord, KeyStatus};
/// use keycycle_scan::notification::render_message;
///
/// let now = Utc::now();
/// let key = CredentialRecord::new("ci-bot", "AKIA1", KeyStatus::Active, now);
/// let action = Action::rotate(&key, ActionReason::ExpiredActiveKey);
///
/// assert_eq!(
///     render_message(&action, now, true),
///     "DRYRUN: ROTATE key ci-bot:AKIA1.  Active key has expired."
/// );
/// ```
pub fn render_message(action: &Action, now: DateTime<Utc>, dry_run: bool) -> String {
    match action.kind {
        ActionKind::Warn { action_date } => warning_message(action, days_until(now, action_date)),
        kind => {
            let mode = if dry_run { "DRYRUN" } else { "ACTION" };
            format!(
                "{mode}: {} key {}.  {}",
                kind.label(),
                action.target,
                action.reason.description()
            )
        }
    }
}

/// Inputs shared by every payload of one scan
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Account being scanned
    pub account: &'a Account,
    /// Scan clock reading
    pub now: DateTime<Utc>,
    /// Audit mode
    pub dry_run: bool,
    /// Template name
    pub email_template: &'a str,
    /// Policy the decisions were made under
    pub policy: &'a PolicyConfig,
}

/// Build the payload for `recipient` covering `actions`
pub fn build_payload(
    ctx: &RenderContext<'_>,
    recipient: &str,
    actions: &[&QueuedAction],
) -> NotificationPayload {
    NotificationPayload {
        recipient: recipient.to_string(),
        subject: SUBJECT.to_string(),
        email_template: ctx.email_template.to_string(),
        template_values: TemplateValues {
            account_id: ctx.account.id.clone(),
            account_name: ctx.account.name.clone(),
            timestamp: ctx.now.to_rfc3339(),
            actions: actions
                .iter()
                .map(|queued| render_message(&queued.action, ctx.now, ctx.dry_run))
                .collect(),
            rotation_period_days: ctx.policy.rotation_period().num_days(),
            installation_grace_period_days: ctx.policy.installation_grace().num_days(),
            recovery_grace_period_days: ctx.policy.recovery_grace().num_days(),
        },
    }
}

/// Deliver a payload, retrying per `policy`
pub async fn send_with_retry(
    sender: &dyn NotificationSender,
    payload: &NotificationPayload,
    policy: &RetryPolicy,
) -> ScanResult<()> {
    retry_with_backoff(policy, "send_notification", || sender.send(payload)).await
}
