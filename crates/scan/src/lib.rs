//! Keycycle Scan - account scans around the lifecycle engine
//!
//! The engine in `keycycle-lifecycle` only decides. This crate wires it to
//! the outside world through collaborator traits:
//!
//! - [`CredentialStore`] lists, issues, deactivates and deletes keys
//! - [`SecretSink`] stores and replicates newly issued secrets
//! - [`ExemptionSource`] names identities that are never evaluated
//! - [`NotificationSender`] delivers rendered notifications
//!
//! A [`Scanner`] runs one account (or a whole inventory) against a single
//! clock reading, executes the decided actions unless in audit mode and
//! notifies the account contact plus every tagged resource owner.
//!
//! In-memory implementations of every trait live in [`memory`].
#![forbid(unsafe_code)]

pub mod account;
pub mod config;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod memory;
pub mod notification;
pub mod report;
pub mod retry;
pub mod scanner;
pub mod traits;

pub use account::{Account, AccountStatus};
pub use config::ScanConfig;
pub use error::{ScanError, ScanResult};
pub use executor::{execute_actions, log_actions};
pub use memory::{
    AccountSnapshot, IdentitySnapshot, InventorySnapshot, MemoryNotifier, MemorySecretSink,
    MemoryStore, StaticExemptions,
};
pub use notification::{NotificationPayload, TemplateValues, send_with_retry};
pub use report::{
    AccountFailure, ActionOutcome, Delivery, InventoryReport, QueuedAction, ScanReport,
    SkippedIdentity,
};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use scanner::Scanner;
pub use traits::{
    CredentialStore, ExemptionSource, IssuedCredential, NotificationSender, SecretSink,
};

/// Commonly used types
pub mod prelude {
    pub use crate::account::{Account, AccountStatus};
    pub use crate::config::ScanConfig;
    pub use crate::error::{ScanError, ScanResult};
    pub use crate::memory::{
        InventorySnapshot, MemoryNotifier, MemorySecretSink, MemoryStore, StaticExemptions,
    };
    pub use crate::report::{InventoryReport, ScanReport};
    pub use crate::retry::RetryPolicy;
    pub use crate::scanner::Scanner;
    pub use crate::traits::{CredentialStore, ExemptionSource, NotificationSender, SecretSink};
}
