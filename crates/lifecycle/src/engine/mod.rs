//! Decision Engine
//!
//! Per-identity entry point. Evaluation runs in two stages:
//!
//! 1. **Pre-pass** over every record: never-used keys past expiry are
//!    replaced outright and leave the evaluation; never-used keys nearing
//!    expiry are warned about and stay in.
//! 2. **Dispatch** on the remaining keys, classified by
//!    (record count, active count, expired count) into a [`Case`] whose
//!    handler owns one decision table.
//!
//! The engine reads nothing beyond its arguments and keeps nothing between
//! calls, so the same inputs always produce the same ordered action list.

mod pair;
mod single;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::action::Action;
use crate::lifecycle::{Checkpoint, Key};
use crate::policy::PolicyConfig;
use crate::reason::ActionReason;
use crate::record::CredentialSet;

/// Inputs shared by every case handler
#[derive(Debug, Clone, Copy)]
pub(crate) struct Context<'p> {
    pub(crate) policy: &'p PolicyConfig,
    pub(crate) at: Checkpoint,
    pub(crate) force_rotate: bool,
}

/// Composition of the keys left after the pre-pass
#[derive(Debug, Clone, Copy)]
enum Case<'a> {
    Empty,
    Single(Key<'a>),
    InactivePair { keys: [Key<'a>; 2], expired: usize },
    Mixed { active: Key<'a>, inactive: Key<'a> },
    ActivePair { keys: [Key<'a>; 2], expired: usize },
}

impl<'a> Case<'a> {
    fn classify(keys: &[Key<'a>], at: &Checkpoint) -> Self {
        let expired = |pair: &[Key<'a>; 2]| {
            pair.iter().filter(|k| at.is_due(k.expires_at())).count()
        };

        match keys {
            [] => Case::Empty,
            [key] => Case::Single(*key),
            [a, b, ..] => match (a.record.is_active(), b.record.is_active()) {
                (false, false) => {
                    let keys = [*a, *b];
                    Case::InactivePair {
                        expired: expired(&keys),
                        keys,
                    }
                }
                (true, false) => Case::Mixed {
                    active: *a,
                    inactive: *b,
                },
                (false, true) => Case::Mixed {
                    active: *b,
                    inactive: *a,
                },
                (true, true) => {
                    let keys = [*a, *b];
                    Case::ActivePair {
                        expired: expired(&keys),
                        keys,
                    }
                }
            },
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Case::Empty => "empty",
            Case::Single(_) => "single",
            Case::InactivePair { .. } => "inactive_pair",
            Case::Mixed { .. } => "mixed",
            Case::ActivePair { .. } => "active_pair",
        }
    }
}

/// Decide which lifecycle actions apply to one identity's keys at `now`
///
/// `force_rotate` requests rotation of active keys regardless of age.
/// Output order is significant: a Delete or Deactivate always precedes the
/// Rotate or Warn it frees a slot for.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use keycycle_lifecycle::prelude::*;
///
/// let now = Utc::now();
/// let policy = PolicyConfig::default();
///
/// // Created 85 days ago, expires in 5 days: inside the 7 day warning window.
/// let key = CredentialRecord::new("svc", "k1", KeyStatus::Active, now - Duration::days(85))
///     .with_last_used(now - Duration::days(1));
/// let actions = evaluate(&CredentialSet::new([key]).unwrap(), now, false, &policy);
///
/// assert_eq!(actions[0].reason, ActionReason::KeyPendingRotation);
/// assert_eq!(actions[0].action_date(), Some(now + Duration::days(5)));
/// ```
pub fn evaluate(
    set: &CredentialSet,
    now: DateTime<Utc>,
    force_rotate: bool,
    policy: &PolicyConfig,
) -> Vec<Action> {
    let ctx = Context {
        policy,
        at: Checkpoint::new(now, policy),
        force_rotate,
    };

    let mut actions = Vec::new();
    let mut remaining = Vec::with_capacity(set.len());

    for record in set.records() {
        let key = Key::new(record, policy);

        if !record.was_used() {
            if ctx.at.is_due(key.expires_at()) {
                actions.push(Action::rotate_and_delete(
                    record,
                    ActionReason::UnusedExpiredKey,
                ));
                continue;
            }
            if ctx.at.is_pending(key.expires_at()) {
                actions.push(Action::warn(
                    record,
                    ActionReason::UnusedKeyPendingDeletion,
                    key.expires_at(),
                ));
            }
        }

        remaining.push(key);
    }

    let case = Case::classify(&remaining, &ctx.at);
    debug!(
        identity = set.owner().unwrap_or_default(),
        case = case.name(),
        force_rotate,
        pre_pass_actions = actions.len(),
        "Evaluating credential set"
    );

    match case {
        Case::Empty => {}
        Case::Single(key) => single::evaluate_single(&ctx, key, &mut actions),
        Case::InactivePair { keys, expired } => {
            pair::evaluate_inactive_pair(&ctx, keys, expired, &mut actions);
        }
        Case::Mixed { active, inactive } => {
            pair::evaluate_mixed(&ctx, active, inactive, &mut actions);
        }
        Case::ActivePair { keys, expired } => {
            pair::evaluate_active_pair(&ctx, keys, expired, &mut actions);
        }
    }

    for action in &actions {
        debug!(
            identity = action.owner(),
            key_id = action.key_id(),
            kind = action.kind.label(),
            reason = action.reason.code(),
            "Emitting action"
        );
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::record::{CredentialRecord, KeyStatus};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)
    }

    #[test]
    fn test_zero_records_yield_nothing() {
        let actions = evaluate(&CredentialSet::empty(), now(), true, &PolicyConfig::default());
        assert!(actions.is_empty());
    }

    #[test]
    fn test_unused_expired_key_leaves_dispatch() {
        let created_at = now() - Duration::days(100);
        let key = CredentialRecord::new("svc", "k1", KeyStatus::Active, created_at);
        let set = CredentialSet::new([key.clone()]).unwrap();

        let actions = evaluate(&set, now(), true, &PolicyConfig::default());

        assert_eq!(
            actions,
            vec![Action::rotate_and_delete(&key, ActionReason::UnusedExpiredKey)]
        );
    }

    #[test]
    fn test_unused_pending_key_stays_in_dispatch() {
        let key = CredentialRecord::new("svc", "k1", KeyStatus::Active, now() - Duration::days(85));
        let set = CredentialSet::new([key.clone()]).unwrap();
        let expires = now() + Duration::days(5);

        let actions = evaluate(&set, now(), false, &PolicyConfig::default());

        assert_eq!(
            actions,
            vec![
                Action::warn(&key, ActionReason::UnusedKeyPendingDeletion, expires),
                Action::warn(&key, ActionReason::KeyPendingRotation, expires),
            ]
        );
    }

    #[test]
    fn test_classification_ignores_input_order() {
        let active = CredentialRecord::new("svc", "a", KeyStatus::Active, now() - Duration::days(1))
            .with_last_used(now());
        let created_at = now() - Duration::days(60);
        let inactive = CredentialRecord::new("svc", "i", KeyStatus::Inactive, created_at)
            .with_last_used(now() - Duration::days(30));
        let policy = PolicyConfig::default();

        let forward = evaluate(
            &CredentialSet::new([active.clone(), inactive.clone()]).unwrap(),
            now(),
            true,
            &policy,
        );
        let backward = evaluate(
            &CredentialSet::new([inactive, active]).unwrap(),
            now(),
            true,
            &policy,
        );

        assert_eq!(forward, backward);
        assert_eq!(forward[0].kind, ActionKind::Delete);
        assert_eq!(forward[1].kind, ActionKind::Rotate);
    }
}
