//! Action Reason Taxonomy
//!
//! Closed set of reasons attached to every action. The human-readable text
//! is looked up by tag and used verbatim by notification rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an action was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionReason {
    /// Expired key that has never been used
    UnusedExpiredKey,
    /// Active key has expired
    ExpiredActiveKey,
    /// Rotation was forced for the identity
    ForcedRotation,
    /// Both active keys expired; this one was least recently used
    ExpiredActiveKeyConflictLru,
    /// Active key expired while an inactive key occupies the second slot
    ExpiredInactiveKeyConflict,
    /// Forced rotation with two active keys; this one was least recently used
    ForcedRotationConflictLru,
    /// Forced rotation while an inactive key occupies the second slot
    ForcedInactiveKeyConflict,
    /// Installation grace period ended
    InstallGracePeriodEnd,
    /// Recovery grace period ended
    RecoverGracePeriodEnd,
    /// Key will be rotated soon
    KeyPendingRotation,
    /// Key will be deactivated soon
    KeyPendingDeactivation,
    /// Key will be deleted soon
    KeyPendingDeletion,
    /// Key will expire but cannot be rotated while the other key exists
    KeyPendingExpirationConflict,
    /// Key will be deleted to make room for the other key's rotation
    KeyPendingDeletionConflict,
    /// Key is about to expire without ever having been used
    UnusedKeyPendingDeletion,
}

impl ActionReason {
    /// Every reason, in declaration order
    pub const ALL: [ActionReason; 15] = [
        ActionReason::UnusedExpiredKey,
        ActionReason::ExpiredActiveKey,
        ActionReason::ForcedRotation,
        ActionReason::ExpiredActiveKeyConflictLru,
        ActionReason::ExpiredInactiveKeyConflict,
        ActionReason::ForcedRotationConflictLru,
        ActionReason::ForcedInactiveKeyConflict,
        ActionReason::InstallGracePeriodEnd,
        ActionReason::RecoverGracePeriodEnd,
        ActionReason::KeyPendingRotation,
        ActionReason::KeyPendingDeactivation,
        ActionReason::KeyPendingDeletion,
        ActionReason::KeyPendingExpirationConflict,
        ActionReason::KeyPendingDeletionConflict,
        ActionReason::UnusedKeyPendingDeletion,
    ];

    /// Stable machine-readable code
    pub const fn code(self) -> &'static str {
        match self {
            ActionReason::UnusedExpiredKey => "UNUSED_EXPIRED_KEY",
            ActionReason::ExpiredActiveKey => "EXPIRED_ACTIVE_KEY",
            ActionReason::ForcedRotation => "FORCED_ROTATION",
            ActionReason::ExpiredActiveKeyConflictLru => "EXPIRED_ACTIVE_KEY_CONFLICT_LRU",
            ActionReason::ExpiredInactiveKeyConflict => "EXPIRED_INACTIVE_KEY_CONFLICT",
            ActionReason::ForcedRotationConflictLru => "FORCED_ROTATION_CONFLICT_LRU",
            ActionReason::ForcedInactiveKeyConflict => "FORCED_INACTIVE_KEY_CONFLICT",
            ActionReason::InstallGracePeriodEnd => "INSTALL_GRACE_PERIOD_END",
            ActionReason::RecoverGracePeriodEnd => "RECOVER_GRACE_PERIOD_END",
            ActionReason::KeyPendingRotation => "KEY_PENDING_ROTATION",
            ActionReason::KeyPendingDeactivation => "KEY_PENDING_DEACTIVATION",
            ActionReason::KeyPendingDeletion => "KEY_PENDING_DELETION",
            ActionReason::KeyPendingExpirationConflict => "KEY_PENDING_EXPIRATION_CONFLICT",
            ActionReason::KeyPendingDeletionConflict => "KEY_PENDING_DELETION_CONFLICT",
            ActionReason::UnusedKeyPendingDeletion => "UNUSED_KEY_PENDING_DELETION",
        }
    }

    /// Human-readable text used verbatim in notifications
    pub const fn description(self) -> &'static str {
        match self {
            ActionReason::UnusedExpiredKey => "Expired key has never been used.",
            ActionReason::ExpiredActiveKey => "Active key has expired.",
            ActionReason::ForcedRotation => "Forced active key rotation.",
            ActionReason::ExpiredActiveKeyConflictLru => {
                "Expired active key with conflict, least recently used."
            }
            ActionReason::ExpiredInactiveKeyConflict => {
                "Expired key with conflict, already inactive."
            }
            ActionReason::ForcedRotationConflictLru => {
                "Forced active key rotation with conflict, least recently used."
            }
            ActionReason::ForcedInactiveKeyConflict => {
                "Forced rotation with conflict, already inactive."
            }
            ActionReason::InstallGracePeriodEnd => "Installation grace period has ended.",
            ActionReason::RecoverGracePeriodEnd => "Recovery grace period has ended.",
            ActionReason::KeyPendingRotation => "Key will be rotated soon.",
            ActionReason::KeyPendingDeactivation => {
                "Key will be deactivated soon, please install new key."
            }
            ActionReason::KeyPendingDeletion => {
                "Key will be permanently deleted soon, please validate new key."
            }
            ActionReason::KeyPendingExpirationConflict => {
                "Key will expire soon, cannot be rotated due to presence of other key."
            }
            ActionReason::KeyPendingDeletionConflict => {
                "Key will be permanently deleted soon, due to conflict."
            }
            ActionReason::UnusedKeyPendingDeletion => {
                "Key will be permanently deleted soon, key is about to expire and has never \
                 been used."
            }
        }
    }

    /// Check if the reason describes an upcoming transition
    pub const fn is_warning(self) -> bool {
        matches!(
            self,
            ActionReason::KeyPendingRotation
                | ActionReason::KeyPendingDeactivation
                | ActionReason::KeyPendingDeletion
                | ActionReason::KeyPendingExpirationConflict
                | ActionReason::KeyPendingDeletionConflict
                | ActionReason::UnusedKeyPendingDeletion
        )
    }

    /// Check if the reason stems from the sibling key's state
    pub const fn is_conflict(self) -> bool {
        matches!(
            self,
            ActionReason::ExpiredActiveKeyConflictLru
                | ActionReason::ExpiredInactiveKeyConflict
                | ActionReason::ForcedRotationConflictLru
                | ActionReason::ForcedInactiveKeyConflict
                | ActionReason::KeyPendingExpirationConflict
                | ActionReason::KeyPendingDeletionConflict
        )
    }
}

impl fmt::Display for ActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
