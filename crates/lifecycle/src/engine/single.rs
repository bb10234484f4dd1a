//! One remaining key. First matching row wins.

use super::Context;
use crate::action::Action;
use crate::lifecycle::Key;
use crate::reason::ActionReason;

pub(super) fn evaluate_single(ctx: &Context<'_>, key: Key<'_>, out: &mut Vec<Action>) {
    let record = key.record;

    if record.is_active() {
        let expires_at = key.expires_at();
        if ctx.at.is_due(expires_at) {
            out.push(Action::rotate(record, ActionReason::ExpiredActiveKey));
        } else if ctx.force_rotate {
            out.push(Action::rotate(record, ActionReason::ForcedRotation));
        } else if ctx.at.is_pending(expires_at) {
            out.push(Action::warn(
                record,
                ActionReason::KeyPendingRotation,
                expires_at,
            ));
        }
    } else {
        let delete_at = key.dates.delete_eligible_at;
        if ctx.at.is_due(delete_at) {
            out.push(Action::delete(record, ActionReason::RecoverGracePeriodEnd));
        } else if ctx.at.is_pending(delete_at) {
            out.push(Action::warn(record, ActionReason::KeyPendingDeletion, delete_at));
        }
    }
}
