//! In-memory collaborators
//!
//! Snapshot-backed implementations of every collaborator trait. The CLI
//! scans JSON inventories through them and the tests inject failures with
//! them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keycycle_lifecycle::{CredentialRecord, KeyStatus};
use parking_lot::{Mutex, RwLock};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

use crate::account::Account;
use crate::error::{ScanError, ScanResult};
use crate::notification::NotificationPayload;
use crate::traits::{
    CredentialStore, ExemptionSource, IssuedCredential, NotificationSender, SecretSink,
};

const MAX_KEYS: usize = keycycle_lifecycle::CredentialSet::MAX_PER_IDENTITY;

// ── Snapshot format ─────────────────────────────────────────────────────────

/// One identity with its tags and keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    /// Identity tags
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Access keys
    #[serde(default)]
    pub credentials: Vec<CredentialRecord>,
}

/// One account of an inventory file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account details
    #[serde(flatten)]
    pub account: Account,
    /// Members of the account's exemption group
    #[serde(default)]
    pub exempt_identities: BTreeSet<String>,
    /// Identities by name
    #[serde(default)]
    pub identities: BTreeMap<String, IdentitySnapshot>,
}

/// A whole inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// Accounts in scan order
    pub accounts: Vec<AccountSnapshot>,
}

impl InventorySnapshot {
    /// Accounts in scan order
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.iter().map(|a| a.account.clone()).collect()
    }
}

// ── Credential store ────────────────────────────────────────────────────────

type Identities = BTreeMap<String, IdentitySnapshot>;

/// Credential store over in-memory snapshots
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<BTreeMap<String, Identities>>,
    failing_keys: RwLock<HashSet<String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every account of an inventory
    pub fn from_inventory(inventory: &InventorySnapshot) -> Self {
        let accounts = inventory
            .accounts
            .iter()
            .map(|a| (a.account.id.clone(), a.identities.clone()))
            .collect();
        Self {
            accounts: RwLock::new(accounts),
            failing_keys: RwLock::default(),
        }
    }

    /// Copy of `inventory` with the store's current identities
    pub fn export(&self, inventory: &InventorySnapshot) -> InventorySnapshot {
        let accounts = self.accounts.read();
        let mut exported = inventory.clone();
        for snapshot in &mut exported.accounts {
            if let Some(identities) = accounts.get(&snapshot.account.id) {
                snapshot.identities.clone_from(identities);
            }
        }
        exported
    }

    /// Add an identity, replacing its tags if it exists
    pub fn insert_identity<I, K, V>(&self, account: &str, identity: &str, tags: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut accounts = self.accounts.write();
        let entry = accounts
            .entry(account.to_string())
            .or_default()
            .entry(identity.to_string())
            .or_default();
        entry.tags = tags.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    }

    /// Add a key under its owner, creating the identity if needed
    ///
    /// No key limit is enforced here, so broken snapshots can be staged.
    pub fn insert_credential(&self, account: &str, record: CredentialRecord) {
        self.accounts
            .write()
            .entry(account.to_string())
            .or_default()
            .entry(record.owner.clone())
            .or_default()
            .credentials
            .push(record);
    }

    /// Current keys of an identity
    pub fn credentials(&self, account: &str, identity: &str) -> Vec<CredentialRecord> {
        self.accounts
            .read()
            .get(account)
            .and_then(|ids| ids.get(identity))
            .map(|id| id.credentials.clone())
            .unwrap_or_default()
    }

    /// Make every deactivate or delete call on `key_id` fail
    pub fn fail_key(&self, key_id: impl Into<String>) {
        self.failing_keys.write().insert(key_id.into());
    }

    fn check_key(&self, operation: &'static str, target: &str, key_id: &str) -> ScanResult<()> {
        if self.failing_keys.read().contains(key_id) {
            return Err(ScanError::store(operation, target, "injected failure"));
        }
        Ok(())
    }

    fn with_identity<T>(
        &self,
        operation: &'static str,
        account: &str,
        identity: &str,
        f: impl FnOnce(&mut IdentitySnapshot) -> ScanResult<T>,
    ) -> ScanResult<T> {
        let mut accounts = self.accounts.write();
        let snapshot = accounts
            .get_mut(account)
            .and_then(|ids| ids.get_mut(identity))
            .ok_or_else(|| {
                ScanError::store(operation, format!("{account}/{identity}"), "no such identity")
            })?;
        f(snapshot)
    }

    fn with_key(
        &self,
        operation: &'static str,
        account: &str,
        identity: &str,
        key_id: &str,
        f: impl FnOnce(&mut Vec<CredentialRecord>, usize),
    ) -> ScanResult<()> {
        let target = format!("{identity}:{key_id}");
        self.check_key(operation, &target, key_id)?;
        self.with_identity(operation, account, identity, |snapshot| {
            let index = snapshot
                .credentials
                .iter()
                .position(|r| r.key_id == key_id)
                .ok_or_else(|| ScanError::store(operation, target.clone(), "no such key"))?;
            f(&mut snapshot.credentials, index);
            Ok(())
        })
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn list_identities(&self, account: &str) -> ScanResult<Vec<String>> {
        self.accounts
            .read()
            .get(account)
            .map(|ids| ids.keys().cloned().collect())
            .ok_or_else(|| ScanError::store("list_identities", account, "no such account"))
    }

    async fn identity_tags(
        &self,
        account: &str,
        identity: &str,
    ) -> ScanResult<HashMap<String, String>> {
        self.with_identity("identity_tags", account, identity, |snapshot| {
            Ok(snapshot
                .tags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        })
    }

    async fn list_credentials(
        &self,
        account: &str,
        identity: &str,
    ) -> ScanResult<Vec<CredentialRecord>> {
        self.with_identity("list_credentials", account, identity, |snapshot| {
            Ok(snapshot.credentials.clone())
        })
    }

    async fn issue_credential(
        &self,
        account: &str,
        identity: &str,
        issued_at: DateTime<Utc>,
    ) -> ScanResult<IssuedCredential> {
        self.with_identity("issue_credential", account, identity, |snapshot| {
            if snapshot.credentials.len() >= MAX_KEYS {
                return Err(ScanError::store(
                    "issue_credential",
                    format!("{account}/{identity}"),
                    "access key limit exceeded",
                ));
            }

            let mut key_id = Uuid::new_v4().simple().to_string().to_uppercase();
            key_id.truncate(16);
            let key_id = format!("AKIA{key_id}");

            snapshot.credentials.push(CredentialRecord::new(
                identity,
                key_id.clone(),
                KeyStatus::Active,
                issued_at,
            ));

            Ok(IssuedCredential {
                owner: identity.to_string(),
                key_id,
                created_at: issued_at,
                secret: SecretString::from(Uuid::new_v4().simple().to_string()),
            })
        })
    }

    async fn deactivate_credential(
        &self,
        account: &str,
        identity: &str,
        key_id: &str,
    ) -> ScanResult<()> {
        self.with_key("deactivate_credential", account, identity, key_id, |keys, index| {
            keys[index].status = KeyStatus::Inactive;
        })
    }

    async fn delete_credential(
        &self,
        account: &str,
        identity: &str,
        key_id: &str,
    ) -> ScanResult<()> {
        self.with_key("delete_credential", account, identity, key_id, |keys, index| {
            keys.remove(index);
        })
    }
}

// ── Secret sink ─────────────────────────────────────────────────────────────

/// Record of a published secret; the secret itself is not kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedSecret {
    /// Account the key belongs to
    pub account: String,
    /// Identity owning the key
    pub owner: String,
    /// Key identifier
    pub key_id: String,
}

/// Secret sink recording what was published
#[derive(Debug, Default)]
pub struct MemorySecretSink {
    published: Mutex<Vec<PublishedSecret>>,
}

impl MemorySecretSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far
    pub fn published(&self) -> Vec<PublishedSecret> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl SecretSink for MemorySecretSink {
    async fn publish(&self, account: &str, credential: &IssuedCredential) -> ScanResult<()> {
        if credential.secret.expose_secret().is_empty() {
            return Err(ScanError::Secret {
                target: format!("{}:{}", credential.owner, credential.key_id),
                reason: "empty secret".into(),
            });
        }

        self.published.lock().push(PublishedSecret {
            account: account.to_string(),
            owner: credential.owner.clone(),
            key_id: credential.key_id.clone(),
        });
        Ok(())
    }
}

// ── Exemptions ──────────────────────────────────────────────────────────────

/// Fixed exemption lists
#[derive(Debug, Clone, Default)]
pub struct StaticExemptions {
    global: HashSet<String>,
    per_account: HashMap<String, HashSet<String>>,
    unavailable: HashSet<String>,
}

impl StaticExemptions {
    /// Exempt `identities` in every account
    pub fn new<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            global: identities.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Global list plus each inventory account's exemption group
    pub fn from_inventory<I, S>(global: I, inventory: &InventorySnapshot) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut exemptions = Self::new(global);
        for snapshot in &inventory.accounts {
            exemptions = exemptions.with_account(
                snapshot.account.id.clone(),
                snapshot.exempt_identities.iter().cloned(),
            );
        }
        exemptions
    }

    /// Exempt `identities` in `account` only
    #[must_use]
    pub fn with_account<I, S>(mut self, account: impl Into<String>, identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.per_account
            .entry(account.into())
            .or_default()
            .extend(identities.into_iter().map(Into::into));
        self
    }

    /// Make lookups for `account` fail as if its group did not exist
    #[must_use]
    pub fn with_missing_group(mut self, account: impl Into<String>) -> Self {
        self.unavailable.insert(account.into());
        self
    }
}

#[async_trait]
impl ExemptionSource for StaticExemptions {
    async fn exempt_identities(&self, account: &str) -> ScanResult<HashSet<String>> {
        if self.unavailable.contains(account) {
            return Err(ScanError::Exemption {
                account: account.to_string(),
                reason: "exemption group does not exist".into(),
            });
        }

        let mut exempt = self.global.clone();
        if let Some(local) = self.per_account.get(account) {
            exempt.extend(local.iter().cloned());
        }
        Ok(exempt)
    }
}

// ── Notifier ────────────────────────────────────────────────────────────────

/// Notifier collecting payloads instead of sending them
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<NotificationPayload>>,
    failures_left: AtomicU32,
    always_fail: bool,
}

impl MemoryNotifier {
    /// Create a notifier that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` sends
    pub fn failing(count: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(count),
            ..Self::default()
        }
    }

    /// Reject every send
    pub fn unreachable() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    /// Payloads accepted so far
    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotificationSender for MemoryNotifier {
    async fn send(&self, payload: &NotificationPayload) -> ScanResult<()> {
        let injected = self.always_fail
            || self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();

        if injected {
            return Err(ScanError::Notification {
                recipient: payload.recipient.clone(),
                reason: "injected failure".into(),
            });
        }

        self.sent.lock().push(payload.clone());
        Ok(())
    }
}
