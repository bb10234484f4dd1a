//! Scan reports
//!
//! Everything a scan decided, did and failed to do, in a serializable form.

use chrono::{DateTime, Utc};
use keycycle_lifecycle::Action;
use serde::{Deserialize, Serialize};

/// An engine action routed through a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAction {
    /// Decision for one key
    #[serde(flatten)]
    pub action: Action,

    /// Owner contact taken from the identity's resource-owner tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_owner: Option<String>,
}

impl QueuedAction {
    /// Queue an action with no resource owner
    pub fn new(action: Action) -> Self {
        Self {
            action,
            resource_owner: None,
        }
    }
}

/// Result of executing one action against the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Action attempted
    pub action: Action,

    /// Failure text; absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionOutcome {
    /// Check if the action took effect
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Identity that could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedIdentity {
    /// Identity name
    pub identity: String,
    /// Why it was skipped
    pub reason: String,
}

/// Delivery attempt for one notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Recipient address
    pub recipient: String,

    /// Number of actions in the message
    pub actions: usize,

    /// Failure text after retries; absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of scanning one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Account identifier
    pub account_id: String,

    /// Clock reading every decision was made against
    pub scanned_at: DateTime<Utc>,

    /// Audit mode: nothing was executed
    pub dry_run: bool,

    /// Identities evaluated
    pub evaluated: Vec<String>,

    /// Identities excluded by the exemption source
    pub exempt: Vec<String>,

    /// Identities whose keys could not be evaluated
    pub skipped: Vec<SkippedIdentity>,

    /// Every action decided, in decision order
    pub actions: Vec<QueuedAction>,

    /// Execution results; empty in audit mode
    pub outcomes: Vec<ActionOutcome>,

    /// Notification deliveries
    pub deliveries: Vec<Delivery>,
}

impl ScanReport {
    /// Empty report for an account
    pub fn new(account_id: impl Into<String>, scanned_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            account_id: account_id.into(),
            scanned_at,
            dry_run,
            evaluated: Vec::new(),
            exempt: Vec::new(),
            skipped: Vec::new(),
            actions: Vec::new(),
            outcomes: Vec::new(),
            deliveries: Vec::new(),
        }
    }

    /// Number of actions that failed to execute
    pub fn failed_actions(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    /// Number of notifications that could not be delivered
    pub fn failed_deliveries(&self) -> usize {
        self.deliveries.iter().filter(|d| d.error.is_some()).count()
    }
}

/// Account that could not be scanned at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFailure {
    /// Account identifier
    pub account_id: String,
    /// Error text
    pub error: String,
}

/// Outcome of scanning an inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReport {
    /// One report per scanned account, in inventory order
    pub reports: Vec<ScanReport>,

    /// Accounts whose scan aborted
    pub failures: Vec<AccountFailure>,

    /// Accounts left out because they are not active
    pub skipped_accounts: Vec<String>,
}
