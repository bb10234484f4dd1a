//! Collaborator Traits
//!
//! The I/O boundary of a scan. The engine never calls these; the
//! [`Scanner`](crate::Scanner) drives them around each evaluation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keycycle_lifecycle::CredentialRecord;
use secrecy::SecretString;
use std::collections::{HashMap, HashSet};

use crate::error::ScanResult;
use crate::notification::NotificationPayload;

/// A freshly issued access key and its secret
#[derive(Debug)]
pub struct IssuedCredential {
    /// Identity owning the key
    pub owner: String,
    /// New key identifier
    pub key_id: String,
    /// When the key was issued
    pub created_at: DateTime<Utc>,
    /// Secret half of the key; never logged
    pub secret: SecretString,
}

/// Identity provider holding the access keys
///
/// Each method performs exactly one store call. Implementations report
/// failure per call and never retry.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// List the identities of an account
    async fn list_identities(&self, account: &str) -> ScanResult<Vec<String>>;

    /// Tags attached to an identity
    async fn identity_tags(
        &self,
        account: &str,
        identity: &str,
    ) -> ScanResult<HashMap<String, String>>;

    /// Current key snapshot of an identity
    async fn list_credentials(
        &self,
        account: &str,
        identity: &str,
    ) -> ScanResult<Vec<CredentialRecord>>;

    /// Issue a new active key
    async fn issue_credential(
        &self,
        account: &str,
        identity: &str,
        issued_at: DateTime<Utc>,
    ) -> ScanResult<IssuedCredential>;

    /// Set a key inactive
    async fn deactivate_credential(
        &self,
        account: &str,
        identity: &str,
        key_id: &str,
    ) -> ScanResult<()>;

    /// Permanently remove a key
    async fn delete_credential(&self, account: &str, identity: &str, key_id: &str)
    -> ScanResult<()>;
}

/// Destination for issued secrets
///
/// Stores the new secret where the identity's workloads pick it up and
/// replicates it as configured.
#[async_trait]
pub trait SecretSink: Send + Sync {
    /// Store and replicate a new secret
    async fn publish(&self, account: &str, credential: &IssuedCredential) -> ScanResult<()>;
}

/// Lookup of identities excluded from evaluation
#[async_trait]
pub trait ExemptionSource: Send + Sync {
    /// Identities of `account` that must never be evaluated
    ///
    /// An error means the exemption group could not be read; the scanner
    /// then proceeds with no exemptions.
    async fn exempt_identities(&self, account: &str) -> ScanResult<HashSet<String>>;
}

/// Delivery channel for rendered notifications
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send one notification payload
    async fn send(&self, payload: &NotificationPayload) -> ScanResult<()>;
}
