//! Credential Records
//!
//! Read-only snapshots of an identity's access keys as reported by the
//! credential store. The engine never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LifecycleError, LifecycleResult};

/// Key status as reported by the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyStatus {
    /// Key authenticates requests
    Active,
    /// Key is disabled but still exists
    Inactive,
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStatus::Active => write!(f, "Active"),
            KeyStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

/// One access key of an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Identity owning the key
    pub owner: String,

    /// Key identifier, unique per identity
    pub key_id: String,

    /// Current status
    pub status: KeyStatus,

    /// When the key was issued
    pub created_at: DateTime<Utc>,

    /// Last time the key authenticated a request; `None` if never used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// Create a record for a key that has never been used
    pub fn new(
        owner: impl Into<String>,
        key_id: impl Into<String>,
        status: KeyStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner: owner.into(),
            key_id: key_id.into(),
            status,
            created_at,
            last_used_at: None,
        }
    }

    /// Set the last-used timestamp
    pub fn with_last_used(mut self, last_used_at: DateTime<Utc>) -> Self {
        self.last_used_at = Some(last_used_at);
        self
    }

    /// Check if the key is active
    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }

    /// Check if the key has ever been used
    pub fn was_used(&self) -> bool {
        self.last_used_at.is_some()
    }

    /// Reference to this key for use in actions
    pub fn reference(&self) -> CredentialRef {
        CredentialRef {
            owner: self.owner.clone(),
            key_id: self.key_id.clone(),
        }
    }
}

/// Identity + key pair naming the target of an action
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CredentialRef {
    /// Identity owning the key
    pub owner: String,
    /// Key identifier
    pub key_id: String,
}

impl fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.key_id)
    }
}

/// The keys of one identity, at most two
///
/// Construction enforces the platform invariant: no more than two keys,
/// one owner, unique key identifiers. Input order is preserved and is the
/// order used for stable tie-breaks.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use keycycle_lifecycle::{CredentialRecord, CredentialSet, KeyStatus, LifecycleError};
///
/// let now = Utc::now();
/// let key = |id: &str| CredentialRecord::new("svc", id, KeyStatus::Active, now);
///
/// assert!(CredentialSet::new([key("a"), key("b")]).is_ok());
/// assert!(matches!(
///     CredentialSet::new([key("a"), key("b"), key("c")]),
///     Err(LifecycleError::TooManyCredentials { count: 3, .. })
/// ));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CredentialRecord>", into = "Vec<CredentialRecord>")]
pub struct CredentialSet {
    records: Vec<CredentialRecord>,
}

impl CredentialSet {
    /// Maximum number of keys an identity may hold
    pub const MAX_PER_IDENTITY: usize = 2;

    /// Build a set, validating the per-identity invariant
    pub fn new(records: impl IntoIterator<Item = CredentialRecord>) -> LifecycleResult<Self> {
        let records: Vec<CredentialRecord> = records.into_iter().collect();

        if let Some(first) = records.first() {
            if records.len() > Self::MAX_PER_IDENTITY {
                return Err(LifecycleError::TooManyCredentials {
                    owner: first.owner.clone(),
                    count: records.len(),
                });
            }

            for (index, record) in records.iter().enumerate().skip(1) {
                if record.owner != first.owner {
                    return Err(LifecycleError::MixedOwners {
                        expected: first.owner.clone(),
                        found: record.owner.clone(),
                    });
                }
                if records[..index].iter().any(|r| r.key_id == record.key_id) {
                    return Err(LifecycleError::DuplicateCredential {
                        owner: record.owner.clone(),
                        key_id: record.key_id.clone(),
                    });
                }
            }
        }

        Ok(Self { records })
    }

    /// Set with no keys
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records in input order
    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the identity holds no keys
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identity owning the keys, if any
    pub fn owner(&self) -> Option<&str> {
        self.records.first().map(|r| r.owner.as_str())
    }
}

impl TryFrom<Vec<CredentialRecord>> for CredentialSet {
    type Error = LifecycleError;

    fn try_from(records: Vec<CredentialRecord>) -> LifecycleResult<Self> {
        Self::new(records)
    }
}

impl From<CredentialSet> for Vec<CredentialRecord> {
    fn from(set: CredentialSet) -> Self {
        set.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(owner: &str, key_id: &str) -> CredentialRecord {
        CredentialRecord::new(owner, key_id, KeyStatus::Active, Utc::now())
    }

    #[test]
    fn test_empty_set() {
        let set = CredentialSet::new(Vec::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.owner(), None);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = CredentialSet::new([record("svc", "k1"), record("svc", "k1")]).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::DuplicateCredential {
                owner: "svc".into(),
                key_id: "k1".into(),
            }
        );
    }

    #[test]
    fn test_mixed_owners_rejected() {
        let err = CredentialSet::new([record("svc", "k1"), record("other", "k2")]).unwrap_err();
        assert!(matches!(err, LifecycleError::MixedOwners { .. }));
    }

    #[test]
    fn test_deserialize_enforces_invariant() {
        let now = Utc::now();
        let records = vec![
            record("svc", "k1"),
            record("svc", "k2"),
            record("svc", "k3"),
        ];
        let json = serde_json::to_string(&records).unwrap();

        let parsed: Result<CredentialSet, _> = serde_json::from_str(&json);
        assert!(parsed.is_err());

        let ok = serde_json::to_string(&[record("svc", "k1")
            .with_last_used(now - Duration::days(1))])
        .unwrap();
        let parsed: CredentialSet = serde_json::from_str(&ok).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed.records()[0].was_used());
    }

    #[test]
    fn test_reference_display() {
        assert_eq!(record("svc", "k1").reference().to_string(), "svc:k1");
    }
}
