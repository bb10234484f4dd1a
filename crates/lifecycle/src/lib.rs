//! Keycycle Lifecycle - access-key lifecycle decisions
//!
//! Decides, for the (at most two) access keys of one identity, which
//! lifecycle action applies right now and why.
//!
//! # Features
//!
//! - **Stateless** - every call re-derives the lifecycle phase from timestamps
//! - **Pure** - no I/O, no clock reads, no environment lookups
//! - **Typed reasons** - a closed [`ActionReason`] taxonomy on every action
//! - **Deterministic tie-breaks** - least-recently-used key loses a conflict
//!
//! # Quick Start
//!
//! ```
//! use chrono::{Duration, Utc};
//! use keycycle_lifecycle::prelude::*;
//!
//! let now = Utc::now();
//! let policy = PolicyConfig::default(); // 90d rotation, 7d grace/warn windows
//!
//! let created_at = now - Duration::days(91);
//! let key = CredentialRecord::new("ci-bot", "AKIA0001", KeyStatus::Active, created_at)
//!     .with_last_used(now - Duration::hours(2));
//! let set = CredentialSet::new([key]).unwrap();
//!
//! let actions = evaluate(&set, now, false, &policy);
//! assert_eq!(actions.len(), 1);
//! assert_eq!(actions[0].kind, ActionKind::Rotate);
//! assert_eq!(actions[0].reason, ActionReason::ExpiredActiveKey);
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Actions emitted by the engine
pub mod action;
/// Decision engine entry point and case handlers
pub mod engine;
/// Error types
pub mod error;
/// Derived lifecycle dates
pub mod lifecycle;
/// Rotation policy durations
pub mod policy;
/// Action reason taxonomy
pub mod reason;
/// Credential records and per-identity sets
pub mod record;
/// Two-active-key conflict resolution
pub mod tiebreak;

// ── Root re-exports ─────────────────────────────────────────────────────────

pub use crate::action::{Action, ActionKind};
pub use crate::engine::evaluate;
pub use crate::error::{LifecycleError, LifecycleResult};
pub use crate::lifecycle::{KeyDates, derive_dates};
pub use crate::policy::{PolicyConfig, PolicySettings};
pub use crate::reason::ActionReason;
pub use crate::record::{CredentialRecord, CredentialRef, CredentialSet, KeyStatus};
pub use crate::tiebreak::{TieBreakRule, Victim, pick_victim};

/// Commonly used types and functions
pub mod prelude {
    pub use crate::action::{Action, ActionKind};
    pub use crate::engine::evaluate;
    pub use crate::error::{LifecycleError, LifecycleResult};
    pub use crate::policy::PolicyConfig;
    pub use crate::reason::ActionReason;
    pub use crate::record::{CredentialRecord, CredentialRef, CredentialSet, KeyStatus};
}
