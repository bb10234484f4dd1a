//! Key Lifecycle Model
//!
//! Phase timestamps derived from a record and the policy. Nothing here is
//! stored; every evaluation recomputes them.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::policy::PolicyConfig;
use crate::record::CredentialRecord;

/// Add an offset, saturating at the latest representable instant
///
/// A saturated date is never reached, so the transition it guards never fires.
pub(crate) fn shift(at: DateTime<Utc>, by: TimeDelta) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Phase timestamps of a single key
///
/// Deactivation and deletion dates are anchored on the key's own creation
/// instant, the only retirement signal available for a key with no companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyDates {
    /// `created_at + rotation_period`
    pub expires_at: DateTime<Utc>,
    /// `created_at + installation_grace`
    pub deactivation_eligible_at: DateTime<Utc>,
    /// `created_at + installation_grace + recovery_grace`
    pub delete_eligible_at: DateTime<Utc>,
}

/// Derive the phase timestamps of a key
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use keycycle_lifecycle::{derive_dates, CredentialRecord, KeyStatus, PolicyConfig};
///
/// let created = Utc::now();
/// let key = CredentialRecord::new("svc", "k1", KeyStatus::Inactive, created);
/// let dates = derive_dates(&key, &PolicyConfig::from_days(90, 7, 5, 7));
///
/// assert_eq!(dates.expires_at, created + Duration::days(90));
/// assert_eq!(dates.delete_eligible_at, created + Duration::days(12));
/// ```
pub fn derive_dates(record: &CredentialRecord, policy: &PolicyConfig) -> KeyDates {
    KeyDates {
        expires_at: policy.expires_at(record.created_at),
        deactivation_eligible_at: policy.deactivation_eligible_from(record.created_at),
        delete_eligible_at: policy.delete_eligible_from(record.created_at),
    }
}

impl PolicyConfig {
    /// When a key issued at `created_at` must be rotated
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        shift(created_at, self.rotation_period())
    }

    /// When a key replaced at `anchor` may be deactivated
    pub fn deactivation_eligible_from(&self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        shift(anchor, self.installation_grace())
    }

    /// When a key replaced at `anchor` may be permanently removed
    pub fn delete_eligible_from(&self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        shift(self.deactivation_eligible_from(anchor), self.recovery_grace())
    }
}

/// A single clock reading and the end of its warning window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    pub(crate) now: DateTime<Utc>,
    pub(crate) warn_horizon: DateTime<Utc>,
}

impl Checkpoint {
    pub(crate) fn new(now: DateTime<Utc>, policy: &PolicyConfig) -> Self {
        Self {
            now,
            warn_horizon: shift(now, policy.warn_lead_time()),
        }
    }

    /// Transition at `at` applies now
    pub(crate) fn is_due(&self, at: DateTime<Utc>) -> bool {
        at <= self.now
    }

    /// Transition at `at` falls inside the warning window
    pub(crate) fn is_pending(&self, at: DateTime<Utc>) -> bool {
        at <= self.warn_horizon
    }
}

/// A record annotated with its derived dates
#[derive(Debug, Clone, Copy)]
pub(crate) struct Key<'a> {
    pub(crate) record: &'a CredentialRecord,
    pub(crate) dates: KeyDates,
}

impl<'a> Key<'a> {
    pub(crate) fn new(record: &'a CredentialRecord, policy: &PolicyConfig) -> Self {
        Self {
            record,
            dates: derive_dates(record, policy),
        }
    }

    pub(crate) fn expires_at(&self) -> DateTime<Utc> {
        self.dates.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::KeyStatus;
    use chrono::Duration;

    #[test]
    fn test_last_used_is_preserved() {
        let now = Utc::now();
        let key = CredentialRecord::new("svc", "k1", KeyStatus::Active, now);
        let annotated = Key::new(&key, &PolicyConfig::default());

        assert!(annotated.record.last_used_at.is_none());
        assert_eq!(annotated.expires_at(), now + Duration::days(90));
    }

    #[test]
    fn test_dates_saturate_instead_of_overflowing() {
        let key = CredentialRecord::new("svc", "k1", KeyStatus::Active, DateTime::<Utc>::MAX_UTC);
        let dates = derive_dates(&key, &PolicyConfig::default());

        assert_eq!(dates.expires_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(dates.delete_eligible_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_checkpoint_boundaries_are_inclusive() {
        let now = Utc::now();
        let checkpoint = Checkpoint::new(now, &PolicyConfig::default());

        assert!(checkpoint.is_due(now));
        assert!(!checkpoint.is_due(now + Duration::seconds(1)));
        assert!(checkpoint.is_pending(now + Duration::days(7)));
        assert!(!checkpoint.is_pending(now + Duration::days(7) + Duration::seconds(1)));
    }

    #[test]
    fn test_anchor_helpers() {
        let anchor = Utc::now();
        let policy = PolicyConfig::from_days(90, 3, 4, 7);

        assert_eq!(policy.deactivation_eligible_from(anchor), anchor + Duration::days(3));
        assert_eq!(policy.delete_eligible_from(anchor), anchor + Duration::days(7));
    }
}
