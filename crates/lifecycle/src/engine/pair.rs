//! Two remaining keys
//!
//! Every non-conflict two-key branch has the same shape: one key is on its
//! way out (`retiring`), the other stays (`survivor`). The retiring key is
//! acted on once its retirement date passes; until then warnings cover
//! whichever transition comes first.

use chrono::{DateTime, Utc};

use super::Context;
use crate::action::Action;
use crate::lifecycle::Key;
use crate::reason::ActionReason;
use crate::record::CredentialRecord;
use crate::tiebreak::pick_victim;

/// What happens to the retiring key once its date passes
#[derive(Debug, Clone, Copy)]
enum Retirement {
    Deactivate,
    Delete,
}

impl Retirement {
    const fn due_reason(self) -> ActionReason {
        match self {
            Retirement::Deactivate => ActionReason::InstallGracePeriodEnd,
            Retirement::Delete => ActionReason::RecoverGracePeriodEnd,
        }
    }

    const fn pending_reason(self) -> ActionReason {
        match self {
            Retirement::Deactivate => ActionReason::KeyPendingDeactivation,
            Retirement::Delete => ActionReason::KeyPendingDeletion,
        }
    }

    fn apply(self, record: &CredentialRecord) -> Action {
        match self {
            Retirement::Deactivate => Action::deactivate(record, self.due_reason()),
            Retirement::Delete => Action::delete(record, self.due_reason()),
        }
    }
}

fn retire_or_warn(
    ctx: &Context<'_>,
    retiring: Key<'_>,
    survivor: Key<'_>,
    retire_at: DateTime<Utc>,
    step: Retirement,
    out: &mut Vec<Action>,
) {
    let rotate_at = survivor.expires_at();

    if ctx.at.is_due(retire_at) {
        out.push(step.apply(retiring.record));
        if ctx.at.is_pending(rotate_at) {
            out.push(Action::warn(
                survivor.record,
                ActionReason::KeyPendingRotation,
                rotate_at,
            ));
        }
    } else if ctx.at.is_pending(rotate_at) {
        out.push(Action::warn(
            retiring.record,
            ActionReason::KeyPendingDeletionConflict,
            rotate_at,
        ));
        out.push(Action::warn(
            survivor.record,
            ActionReason::KeyPendingRotation,
            rotate_at,
        ));
    } else if ctx.at.is_pending(retire_at) {
        out.push(Action::warn(retiring.record, step.pending_reason(), retire_at));
    }
}

/// Order two keys by a timestamp, keeping input order on ties
fn ordered_by<'a>(
    [a, b]: [Key<'a>; 2],
    at: impl Fn(&Key<'a>) -> DateTime<Utc>,
) -> (Key<'a>, Key<'a>) {
    if at(&b) < at(&a) { (b, a) } else { (a, b) }
}

pub(super) fn evaluate_inactive_pair(
    ctx: &Context<'_>,
    keys: [Key<'_>; 2],
    expired: usize,
    out: &mut Vec<Action>,
) {
    match expired {
        2 => {
            for key in keys {
                out.push(Action::delete(key.record, ActionReason::RecoverGracePeriodEnd));
            }
        }
        1 => {
            let (expired, unexpired) = ordered_by(keys, |k| k.record.created_at);
            let delete_at = ctx.policy.delete_eligible_from(unexpired.record.created_at);
            retire_or_warn(ctx, expired, unexpired, delete_at, Retirement::Delete, out);
        }
        _ => {}
    }
}

pub(super) fn evaluate_mixed(
    ctx: &Context<'_>,
    active: Key<'_>,
    inactive: Key<'_>,
    out: &mut Vec<Action>,
) {
    // The paired Rotate carries the Delete's conflict reason.
    let conflict = if ctx.at.is_due(active.expires_at()) {
        Some(ActionReason::ExpiredInactiveKeyConflict)
    } else if ctx.force_rotate {
        Some(ActionReason::ForcedInactiveKeyConflict)
    } else {
        None
    };

    if let Some(reason) = conflict {
        out.push(Action::delete(inactive.record, reason));
        out.push(Action::rotate(active.record, reason));
        return;
    }

    let rotated_at = match inactive.record.last_used_at {
        Some(last_used) => active.record.created_at.max(last_used),
        None => active.record.created_at,
    };
    let delete_at = ctx.policy.delete_eligible_from(rotated_at);
    retire_or_warn(ctx, inactive, active, delete_at, Retirement::Delete, out);
}

pub(super) fn evaluate_active_pair(
    ctx: &Context<'_>,
    keys: [Key<'_>; 2],
    expired: usize,
    out: &mut Vec<Action>,
) {
    if expired == 2 || ctx.force_rotate {
        let (delete_reason, rotate_reason) = if expired == 2 {
            (
                ActionReason::ExpiredActiveKeyConflictLru,
                ActionReason::ExpiredActiveKey,
            )
        } else {
            (
                ActionReason::ForcedRotationConflictLru,
                ActionReason::ForcedRotation,
            )
        };

        let victim = pick_victim(keys[0].record, keys[1].record);
        out.push(Action::delete(victim.to_delete, delete_reason));
        out.push(Action::rotate(victim.to_rotate, rotate_reason));
        return;
    }

    let (older, newer) = ordered_by(keys, |k| k.expires_at());

    if expired == 1 {
        let deactivate_at = ctx.policy.deactivation_eligible_from(newer.record.created_at);
        retire_or_warn(ctx, older, newer, deactivate_at, Retirement::Deactivate, out);
    } else if ctx.at.is_pending(newer.expires_at()) {
        out.push(Action::warn(
            older.record,
            ActionReason::KeyPendingDeletionConflict,
            newer.expires_at(),
        ));
        out.push(Action::warn(
            newer.record,
            ActionReason::KeyPendingRotation,
            newer.expires_at(),
        ));
    } else if ctx.at.is_pending(older.expires_at()) {
        out.push(Action::warn(
            older.record,
            ActionReason::KeyPendingExpirationConflict,
            older.expires_at(),
        ));
    }
}
