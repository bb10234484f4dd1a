//! Engine Output
//!
//! One [`Action`] per lifecycle step the caller should take (or be warned
//! about). Only warnings carry a date: the instant the warned-about
//! transition will happen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reason::ActionReason;
use crate::record::{CredentialRecord, CredentialRef};

/// What to do with the target key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Issue a replacement key; the old key stays active for the installation grace
    Rotate,
    /// Set the key inactive
    Deactivate,
    /// Permanently remove the key
    Delete,
    /// Remove the key, then issue a replacement
    RotateAndDelete,
    /// No change yet; the transition happens at `action_date`
    Warn {
        /// When the warned-about transition occurs
        action_date: DateTime<Utc>,
    },
}

impl ActionKind {
    /// Upper-case label used in logs and notifications
    pub const fn label(&self) -> &'static str {
        match self {
            ActionKind::Rotate => "ROTATE",
            ActionKind::Deactivate => "DEACTIVATE",
            ActionKind::Delete => "DELETE",
            ActionKind::RotateAndDelete => "ROTATE_AND_DELETE",
            ActionKind::Warn { .. } => "WARN",
        }
    }

    /// Check if the action only warns
    pub const fn is_warning(&self) -> bool {
        matches!(self, ActionKind::Warn { .. })
    }
}

/// One unit of engine output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Key the action applies to
    pub target: CredentialRef,
    /// What to do
    pub kind: ActionKind,
    /// Why
    pub reason: ActionReason,
}

impl Action {
    /// Create an action against a record
    pub fn new(record: &CredentialRecord, kind: ActionKind, reason: ActionReason) -> Self {
        Self {
            target: record.reference(),
            kind,
            reason,
        }
    }

    /// Rotate `record`
    pub fn rotate(record: &CredentialRecord, reason: ActionReason) -> Self {
        Self::new(record, ActionKind::Rotate, reason)
    }

    /// Deactivate `record`
    pub fn deactivate(record: &CredentialRecord, reason: ActionReason) -> Self {
        Self::new(record, ActionKind::Deactivate, reason)
    }

    /// Delete `record`
    pub fn delete(record: &CredentialRecord, reason: ActionReason) -> Self {
        Self::new(record, ActionKind::Delete, reason)
    }

    /// Delete `record` and issue a replacement
    pub fn rotate_and_delete(record: &CredentialRecord, reason: ActionReason) -> Self {
        Self::new(record, ActionKind::RotateAndDelete, reason)
    }

    /// Warn that `record` transitions at `action_date`
    pub fn warn(
        record: &CredentialRecord,
        reason: ActionReason,
        action_date: DateTime<Utc>,
    ) -> Self {
        Self::new(record, ActionKind::Warn { action_date }, reason)
    }

    /// Date of the warned-about transition, for warnings only
    pub fn action_date(&self) -> Option<DateTime<Utc>> {
        match self.kind {
            ActionKind::Warn { action_date } => Some(action_date),
            _ => None,
        }
    }

    /// Identity owning the target key
    pub fn owner(&self) -> &str {
        &self.target.owner
    }

    /// Target key identifier
    pub fn key_id(&self) -> &str {
        &self.target.key_id
    }
}
