//! Tie-Break Resolver
//!
//! When both keys are active and both must go (expired or force-rotated),
//! one is deleted to free a slot and the other is rotated.

use serde::Serialize;

use crate::record::CredentialRecord;

/// Which precedence rule decided a tie-break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakRule {
    /// Both used: the one used longest ago loses
    LeastRecentlyUsed,
    /// One used: the never-used one loses
    NeverUsed,
    /// Neither used: the one created first loses
    OldestCreated,
}

/// Outcome of a tie-break
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Victim<'a> {
    /// Key to delete
    pub to_delete: &'a CredentialRecord,
    /// Key to rotate
    pub to_rotate: &'a CredentialRecord,
    /// Rule that applied
    pub rule: TieBreakRule,
}

/// Choose which of two conflicting active keys to delete
///
/// First applicable rule wins:
/// 1. both used: delete the smaller `last_used_at`
/// 2. exactly one used: delete the never-used key
/// 3. neither used: delete the smaller `created_at`
///
/// Equal timestamps resolve to the first argument being deleted.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use keycycle_lifecycle::{pick_victim, CredentialRecord, KeyStatus, TieBreakRule};
///
/// let now = Utc::now();
/// let used = CredentialRecord::new("svc", "a", KeyStatus::Active, now)
///     .with_last_used(now - Duration::days(1));
/// let unused = CredentialRecord::new("svc", "b", KeyStatus::Active, now - Duration::days(3));
///
/// let victim = pick_victim(&used, &unused);
/// assert_eq!(victim.to_delete.key_id, "b");
/// assert_eq!(victim.rule, TieBreakRule::NeverUsed);
/// ```
pub fn pick_victim<'a>(a: &'a CredentialRecord, b: &'a CredentialRecord) -> Victim<'a> {
    let (to_delete, to_rotate, rule) = match (a.last_used_at, b.last_used_at) {
        (Some(used_a), Some(used_b)) => {
            if used_b < used_a {
                (b, a, TieBreakRule::LeastRecentlyUsed)
            } else {
                (a, b, TieBreakRule::LeastRecentlyUsed)
            }
        }
        (Some(_), None) => (b, a, TieBreakRule::NeverUsed),
        (None, Some(_)) => (a, b, TieBreakRule::NeverUsed),
        (None, None) => {
            if b.created_at < a.created_at {
                (b, a, TieBreakRule::OldestCreated)
            } else {
                (a, b, TieBreakRule::OldestCreated)
            }
        }
    };

    tracing::debug!(
        to_delete = %to_delete.key_id,
        to_rotate = %to_rotate.key_id,
        rule = ?rule,
        "Resolved active key conflict"
    );

    Victim {
        to_delete,
        to_rotate,
        rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::KeyStatus;
    use chrono::{DateTime, Duration, Utc};
    use rstest::rstest;

    fn key(id: &str, created_days_ago: i64, used_days_ago: Option<i64>) -> CredentialRecord {
        let now = DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000);
        let created_at = now - Duration::days(created_days_ago);
        let record = CredentialRecord::new("svc", id, KeyStatus::Active, created_at);
        match used_days_ago {
            Some(days) => record.with_last_used(now - Duration::days(days)),
            None => record,
        }
    }

    #[rstest]
    #[case::both_used(
        key("a", 95, Some(50)),
        key("b", 95, Some(10)),
        "a",
        TieBreakRule::LeastRecentlyUsed
    )]
    #[case::both_used_reversed(
        key("a", 95, Some(10)),
        key("b", 95, Some(50)),
        "b",
        TieBreakRule::LeastRecentlyUsed
    )]
    #[case::first_unused(key("a", 10, None), key("b", 200, Some(1)), "a", TieBreakRule::NeverUsed)]
    #[case::second_unused(key("a", 200, Some(1)), key("b", 10, None), "b", TieBreakRule::NeverUsed)]
    #[case::none_used_older_first(
        key("a", 120, None),
        key("b", 100, None),
        "a",
        TieBreakRule::OldestCreated
    )]
    #[case::none_used_older_second(
        key("a", 100, None),
        key("b", 120, None),
        "b",
        TieBreakRule::OldestCreated
    )]
    #[case::created_tie_first_loses(
        key("a", 100, None),
        key("b", 100, None),
        "a",
        TieBreakRule::OldestCreated
    )]
    fn test_precedence(
        #[case] a: CredentialRecord,
        #[case] b: CredentialRecord,
        #[case] expected_delete: &str,
        #[case] expected_rule: TieBreakRule,
    ) {
        let victim = pick_victim(&a, &b);

        assert_eq!(victim.to_delete.key_id, expected_delete);
        assert_ne!(victim.to_delete.key_id, victim.to_rotate.key_id);
        assert_eq!(victim.rule, expected_rule);
    }
}
