//! Account Scanner
//!
//! Drives the collaborators around the decision engine for one account:
//!
//! 1. list identities and drop the exempt ones
//! 2. evaluate each identity's keys against a single clock reading
//! 3. tag actions with the identity's resource owner
//! 4. log the queue, execute it unless in audit mode
//! 5. notify the account contact and every resource owner

use chrono::{DateTime, Utc};
use keycycle_lifecycle::{CredentialSet, PolicyConfig, evaluate};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::account::Account;
use crate::config::ScanConfig;
use crate::error::ScanResult;
use crate::executor::{execute_actions, log_actions};
use crate::notification::{RenderContext, build_payload, send_with_retry};
use crate::report::{Delivery, QueuedAction, ScanReport, SkippedIdentity};
use crate::traits::{CredentialStore, ExemptionSource, NotificationSender, SecretSink};

/// Scans accounts with a fixed set of collaborators
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use keycycle_lifecycle::{CredentialRecord, KeyStatus};
/// use keycycle_scan::prelude::*;
/// use std::collections::HashSet;
/// use std::sync::Arc;
///
/// # tokio_test_block(async {
/// let now = Utc::now();
/// let store = Arc::new(MemoryStore::new());
/// store.insert_credential(
///     "111122223333",
///     CredentialRecord::new("ci-bot", "AKIAOLD", KeyStatus::Active, now - Duration::days(100))
///         .with_last_used(now - Duration::days(1)),
/// );
///
/// let scanner = Scanner::new(
///     store.clone(),
///     Arc::new(MemorySecretSink::new()),
///     Arc::new(StaticExemptions::default()),
///     Arc::new(MemoryNotifier::new()),
/// );
///
/// let account = Account::new("111122223333", "prod", "security@example.com");
/// let report = scanner.scan_account(&account, now, &HashSet::new()).await.unwrap();
///
/// assert_eq!(report.actions.len(), 1);
/// assert_eq!(store.credentials("111122223333", "ci-bot").len(), 2);
/// # });
/// # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
/// #     futures::executor::block_on(f)
/// # }
/// ```
pub struct Scanner {
    store: Arc<dyn CredentialStore>,
    secrets: Arc<dyn SecretSink>,
    exemptions: Arc<dyn ExemptionSource>,
    notifier: Arc<dyn NotificationSender>,
    policy: PolicyConfig,
    config: ScanConfig,
}

impl Scanner {
    /// Create a scanner with the default policy and configuration
    pub fn new(
        store: Arc<dyn CredentialStore>,
        secrets: Arc<dyn SecretSink>,
        exemptions: Arc<dyn ExemptionSource>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            store,
            secrets,
            exemptions,
            notifier,
            policy: PolicyConfig::default(),
            config: ScanConfig::default(),
        }
    }

    /// Set the rotation policy
    #[must_use]
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    /// Set the scan configuration
    #[must_use]
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Rotation policy in use
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Scan configuration in use
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    async fn load_exemptions(&self, account: &str) -> HashSet<String> {
        match self.exemptions.exempt_identities(account).await {
            Ok(exempt) => {
                if exempt.is_empty() {
                    info!(account_id = account, "The exempted identities list is empty");
                } else {
                    info!(
                        account_id = account,
                        count = exempt.len(),
                        "The exempted identities list has active exemptions"
                    );
                }
                exempt
            }
            Err(err) => {
                info!(
                    account_id = account,
                    error = %err,
                    "Exemption group unavailable, skipping exemptions check"
                );
                HashSet::new()
            }
        }
    }

    async fn resource_owner(&self, account: &str, identity: &str) -> Option<String> {
        let tag = self.config.owner_tag()?;

        match self.store.identity_tags(account, identity).await {
            Ok(tags) => {
                let owner = tags.get(tag).cloned();
                if let Some(owner) = &owner {
                    info!(identity, owner = %owner, "Identity is tagged with a resource owner");
                } else {
                    info!(identity, tag, "Identity is missing the resource owner tag");
                }
                owner
            }
            Err(err) => {
                warn!(identity, error = %err, "Could not read identity tags");
                None
            }
        }
    }

    async fn evaluate_identity(
        &self,
        account: &str,
        identity: &str,
        now: DateTime<Utc>,
        force_rotate: bool,
    ) -> ScanResult<Vec<QueuedAction>> {
        let records = self.store.list_credentials(account, identity).await?;
        let set = CredentialSet::new(records)?;
        let actions = evaluate(&set, now, force_rotate, &self.policy);

        if actions.is_empty() {
            return Ok(Vec::new());
        }

        let resource_owner = self.resource_owner(account, identity).await;
        Ok(actions
            .into_iter()
            .map(|action| QueuedAction {
                action,
                resource_owner: resource_owner.clone(),
            })
            .collect())
    }

    async fn notify(
        &self,
        account: &Account,
        now: DateTime<Utc>,
        queue: &[QueuedAction],
    ) -> Vec<Delivery> {
        let ctx = RenderContext {
            account,
            now,
            dry_run: self.config.dry_run,
            email_template: self.config.email_template(),
            policy: &self.policy,
        };

        let mut by_owner: BTreeMap<&str, Vec<&QueuedAction>> = BTreeMap::new();
        for queued in queue {
            if let Some(owner) = queued.resource_owner.as_deref() {
                by_owner.entry(owner).or_default().push(queued);
            }
        }

        let everything: Vec<&QueuedAction> = queue.iter().collect();
        let payloads = std::iter::once(build_payload(&ctx, &account.email, &everything)).chain(
            by_owner
                .iter()
                .map(|(owner, actions)| build_payload(&ctx, owner, actions)),
        );

        let mut deliveries = Vec::new();
        for payload in payloads {
            let result = send_with_retry(
                self.notifier.as_ref(),
                &payload,
                &self.config.notification_retry,
            )
            .await;

            match &result {
                Ok(()) => info!(
                    account_id = %account.id,
                    recipient = %payload.recipient,
                    actions = payload.template_values.actions.len(),
                    "Notification sent"
                ),
                Err(err) => error!(
                    account_id = %account.id,
                    recipient = %payload.recipient,
                    error = %err,
                    "Notification failed"
                ),
            }

            deliveries.push(Delivery {
                recipient: payload.recipient.clone(),
                actions: payload.template_values.actions.len(),
                error: result.err().map(|err| err.to_string()),
            });
        }
        deliveries
    }

    /// Scan one account at `now`
    ///
    /// `force_rotate` names identities whose active keys are rotated
    /// regardless of age. Fails only if the identity list cannot be read;
    /// per-identity, per-action and per-notification failures are recorded
    /// in the report.
    pub async fn scan_account(
        &self,
        account: &Account,
        now: DateTime<Utc>,
        force_rotate: &HashSet<String>,
    ) -> ScanResult<ScanReport> {
        info!(
            account_id = %account.id,
            account_name = %account.name,
            dry_run = self.config.dry_run,
            "Evaluating account"
        );

        let mut report = ScanReport::new(account.id.clone(), now, self.config.dry_run);
        let identities = self.store.list_identities(&account.id).await?;

        let exempt = if identities.is_empty() {
            info!(account_id = %account.id, "There are no identities in this account");
            HashSet::new()
        } else {
            info!(
                account_id = %account.id,
                total = identities.len(),
                "Starting identity loop"
            );
            self.load_exemptions(&account.id).await
        };

        let mut queue = Vec::new();
        for identity in identities {
            if exempt.contains(&identity) {
                info!(identity = %identity, "Identity is exempt, skipping");
                report.exempt.push(identity);
                continue;
            }

            let force = force_rotate.contains(&identity);
            if force {
                info!(identity = %identity, "Force rotation requested");
            }

            match self.evaluate_identity(&account.id, &identity, now, force).await {
                Ok(actions) => {
                    queue.extend(actions);
                    report.evaluated.push(identity);
                }
                Err(err) => {
                    error!(identity = %identity, error = %err, "Skipping identity");
                    report.skipped.push(SkippedIdentity {
                        identity,
                        reason: err.to_string(),
                    });
                }
            }
        }

        log_actions(&queue, self.config.dry_run);

        if !queue.is_empty() {
            if !self.config.dry_run {
                report.outcomes = execute_actions(
                    self.store.as_ref(),
                    self.secrets.as_ref(),
                    &account.id,
                    &queue,
                    now,
                )
                .await;
            }
            report.deliveries = self.notify(account, now, &queue).await;
        }

        report.actions = queue;
        info!(
            account_id = %account.id,
            actions = report.actions.len(),
            failed_actions = report.failed_actions(),
            failed_deliveries = report.failed_deliveries(),
            "Account scan complete"
        );
        Ok(report)
    }
}
