//! Scan configuration

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// How a scan runs and whom it notifies
///
/// # Example
///
/// ```
/// use keycycle_scan::ScanConfig;
///
/// let config: ScanConfig = serde_json::from_str(
///     r#"{ "dry_run": true, "resource_owner_tag": "owner-email" }"#,
/// ).unwrap();
/// assert!(config.dry_run);
/// assert_eq!(config.max_concurrent_accounts, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Audit mode: decide and notify, never execute
    pub dry_run: bool,

    /// Identities exempt in every account
    pub exempt_identities: Vec<String>,

    /// Identity tag whose value is the resource owner's address
    pub resource_owner_tag: Option<String>,

    /// Template for notifications in enforce mode
    pub email_template_enforce: String,

    /// Template for notifications in audit mode
    pub email_template_audit: String,

    /// Retry schedule for notification delivery
    pub notification_retry: RetryPolicy,

    /// Upper bound on accounts scanned at once
    pub max_concurrent_accounts: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            exempt_identities: Vec::new(),
            resource_owner_tag: None,
            email_template_enforce: "keycycle-enforce".to_string(),
            email_template_audit: "keycycle-audit".to_string(),
            notification_retry: RetryPolicy::default(),
            max_concurrent_accounts: 8,
        }
    }
}

impl ScanConfig {
    /// Template matching the current mode
    pub fn email_template(&self) -> &str {
        if self.dry_run {
            &self.email_template_audit
        } else {
            &self.email_template_enforce
        }
    }

    /// Concurrency bound, never below one
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_accounts.max(1)
    }

    /// Resource-owner tag, ignoring a blank setting
    pub fn owner_tag(&self) -> Option<&str> {
        self.resource_owner_tag
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}
