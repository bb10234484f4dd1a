//! Decision table scenarios
//!
//! Every branch of the per-identity decision tables, evaluated against a
//! fixed clock. Expected actions are written as
//! `(key_id, kind label, reason, days until action_date)`.

use chrono::{DateTime, Duration, Utc};
use keycycle_lifecycle::ActionReason::*;
use keycycle_lifecycle::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

type Row = (String, &'static str, ActionReason, Option<i64>);

fn now() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)
}

fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

fn key(id: &str, status: KeyStatus, created: i64, used: Option<i64>) -> CredentialRecord {
    let record = CredentialRecord::new("svc", id, status, days_ago(created));
    match used {
        Some(days) => record.with_last_used(days_ago(days)),
        None => record,
    }
}

fn active(id: &str, created: i64, used: Option<i64>) -> CredentialRecord {
    key(id, KeyStatus::Active, created, used)
}

fn inactive(id: &str, created: i64, used: Option<i64>) -> CredentialRecord {
    key(id, KeyStatus::Inactive, created, used)
}

fn summarize(actions: &[Action]) -> Vec<Row> {
    actions
        .iter()
        .map(|a| {
            (
                a.key_id().to_string(),
                a.kind.label(),
                a.reason,
                a.action_date().map(|d| (d - now()).num_days()),
            )
        })
        .collect()
}

fn rows(expected: &[(&str, &'static str, ActionReason, Option<i64>)]) -> Vec<Row> {
    expected
        .iter()
        .map(|(id, label, reason, days)| (id.to_string(), *label, *reason, *days))
        .collect()
}

fn run(records: Vec<CredentialRecord>, force: bool, policy: &PolicyConfig) -> Vec<Row> {
    let set = CredentialSet::new(records).unwrap();
    summarize(&evaluate(&set, now(), force, policy))
}

#[rstest]
// Scenario A
#[case::expired_active(
    vec![active("k1", 91, Some(1))],
    false,
    &[("k1", "ROTATE", ExpiredActiveKey, None)]
)]
// Scenario B
#[case::active_pending_rotation(
    vec![active("k1", 85, Some(1))],
    false,
    &[("k1", "WARN", KeyPendingRotation, Some(5))]
)]
// Scenario C
#[case::both_active_expired(
    vec![active("x", 95, Some(50)), active("y", 95, Some(10))],
    false,
    &[("x", "DELETE", ExpiredActiveKeyConflictLru, None), ("y", "ROTATE", ExpiredActiveKey, None)]
)]
// Scenario D
#[case::fresh_rotation_keeps_inactive(
    vec![active("a", 3, Some(1)), inactive("i", 20, None)],
    false,
    &[]
)]
// Scenario E
#[case::unused_expired(
    vec![active("k1", 91, None)],
    false,
    &[("k1", "ROTATE_AND_DELETE", UnusedExpiredKey, None)]
)]
#[case::active_quiet(vec![active("k1", 10, Some(1))], false, &[])]
#[case::active_forced(
    vec![active("k1", 10, Some(1))],
    true,
    &[("k1", "ROTATE", ForcedRotation, None)]
)]
#[case::expiry_beats_force(
    vec![active("k1", 91, Some(1))],
    true,
    &[("k1", "ROTATE", ExpiredActiveKey, None)]
)]
#[case::inactive_recovered(
    vec![inactive("k1", 15, Some(14))],
    false,
    &[("k1", "DELETE", RecoverGracePeriodEnd, None)]
)]
#[case::inactive_pending_deletion(
    vec![inactive("k1", 10, Some(9))],
    false,
    &[("k1", "WARN", KeyPendingDeletion, Some(4))]
)]
#[case::inactive_quiet(vec![inactive("k1", 2, Some(1))], false, &[])]
#[case::inactive_pair_both_expired(
    vec![inactive("a", 100, Some(95)), inactive("b", 95, Some(91))],
    false,
    &[("a", "DELETE", RecoverGracePeriodEnd, None), ("b", "DELETE", RecoverGracePeriodEnd, None)]
)]
#[case::inactive_pair_delete_superseded(
    vec![inactive("old", 100, Some(50)), inactive("new", 20, Some(15))],
    false,
    &[("old", "DELETE", RecoverGracePeriodEnd, None)]
)]
#[case::inactive_pair_delete_and_warn(
    vec![inactive("new", 85, Some(1)), inactive("old", 100, Some(50))],
    false,
    &[("old", "DELETE", RecoverGracePeriodEnd, None), ("new", "WARN", KeyPendingRotation, Some(5))]
)]
#[case::inactive_pair_pending_deletion(
    vec![inactive("old", 100, Some(50)), inactive("new", 10, Some(1))],
    false,
    &[("old", "WARN", KeyPendingDeletion, Some(4))]
)]
#[case::inactive_pair_quiet(
    vec![inactive("old", 100, Some(50)), inactive("new", 2, Some(1))],
    false,
    &[]
)]
#[case::inactive_pair_unexpired(
    vec![inactive("a", 50, Some(49)), inactive("b", 40, Some(39))],
    false,
    &[]
)]
#[case::mixed_expired_active(
    vec![active("a", 91, Some(1)), inactive("i", 120, Some(100))],
    false,
    &[
        ("i", "DELETE", ExpiredInactiveKeyConflict, None),
        ("a", "ROTATE", ExpiredInactiveKeyConflict, None),
    ]
)]
#[case::mixed_forced(
    vec![inactive("i", 120, Some(100)), active("a", 10, Some(1))],
    true,
    &[
        ("i", "DELETE", ForcedInactiveKeyConflict, None),
        ("a", "ROTATE", ForcedInactiveKeyConflict, None),
    ]
)]
#[case::mixed_recovered(
    vec![active("a", 20, Some(1)), inactive("i", 120, Some(30))],
    false,
    &[("i", "DELETE", RecoverGracePeriodEnd, None)]
)]
#[case::mixed_recovered_and_pending(
    vec![active("a", 85, Some(1)), inactive("i", 120, Some(100))],
    false,
    &[("i", "DELETE", RecoverGracePeriodEnd, None), ("a", "WARN", KeyPendingRotation, Some(5))]
)]
#[case::mixed_late_use_delays_deletion(
    vec![active("a", 20, Some(1)), inactive("i", 120, Some(10))],
    false,
    &[("i", "WARN", KeyPendingDeletion, Some(4))]
)]
#[case::active_pair_forced(
    vec![active("a", 10, Some(5)), active("b", 20, Some(1))],
    true,
    &[("a", "DELETE", ForcedRotationConflictLru, None), ("b", "ROTATE", ForcedRotation, None)]
)]
#[case::active_pair_deactivate(
    vec![active("old", 100, Some(8)), active("new", 10, Some(1))],
    false,
    &[("old", "DEACTIVATE", InstallGracePeriodEnd, None)]
)]
#[case::active_pair_deactivate_and_warn(
    vec![active("new", 85, Some(1)), active("old", 100, Some(8))],
    false,
    &[
        ("old", "DEACTIVATE", InstallGracePeriodEnd, None),
        ("new", "WARN", KeyPendingRotation, Some(5)),
    ]
)]
#[case::active_pair_pending_deactivation(
    vec![active("old", 100, Some(8)), active("new", 3, Some(1))],
    false,
    &[("old", "WARN", KeyPendingDeactivation, Some(4))]
)]
#[case::active_pair_deactivation_boundary(
    vec![active("old", 100, Some(8)), active("new", 0, Some(0))],
    false,
    &[("old", "WARN", KeyPendingDeactivation, Some(7))]
)]
#[case::active_pair_newer_pending(
    vec![active("old", 89, Some(1)), active("new", 84, Some(1))],
    false,
    &[
        ("old", "WARN", KeyPendingDeletionConflict, Some(6)),
        ("new", "WARN", KeyPendingRotation, Some(6)),
    ]
)]
#[case::active_pair_older_pending(
    vec![active("old", 85, Some(1)), active("new", 10, Some(1))],
    false,
    &[("old", "WARN", KeyPendingExpirationConflict, Some(5))]
)]
#[case::active_pair_quiet(vec![active("a", 30, Some(1)), active("b", 10, Some(1))], false, &[])]
#[case::unused_expired_frees_slot(
    vec![active("a", 100, None), active("b", 10, Some(1))],
    false,
    &[("a", "ROTATE_AND_DELETE", UnusedExpiredKey, None)]
)]
#[case::both_unused_expired(
    vec![active("a", 100, None), inactive("b", 95, None)],
    false,
    &[
        ("a", "ROTATE_AND_DELETE", UnusedExpiredKey, None),
        ("b", "ROTATE_AND_DELETE", UnusedExpiredKey, None),
    ]
)]
#[case::unused_pending_then_pair(
    vec![active("a", 85, None), active("b", 10, Some(1))],
    false,
    &[
        ("a", "WARN", UnusedKeyPendingDeletion, Some(5)),
        ("a", "WARN", KeyPendingExpirationConflict, Some(5)),
    ]
)]
fn test_default_policy(
    #[case] records: Vec<CredentialRecord>,
    #[case] force: bool,
    #[case] expected: &[(&str, &'static str, ActionReason, Option<i64>)],
) {
    assert_eq!(run(records, force, &PolicyConfig::default()), rows(expected));
}

#[test]
fn test_inactive_pair_rotation_warning_precedes_deletion() {
    // GIVEN long grace periods so the superseded key is not yet deletable
    let policy = PolicyConfig::from_days(90, 60, 60, 7);
    let records = vec![inactive("old", 100, Some(50)), inactive("new", 85, Some(1))];

    // WHEN the surviving key nears expiry
    let actions = run(records, false, &policy);

    // THEN both keys are warned about the survivor's rotation date
    assert_eq!(
        actions,
        rows(&[
            ("old", "WARN", KeyPendingDeletionConflict, Some(5)),
            ("new", "WARN", KeyPendingRotation, Some(5)),
        ])
    );
}

#[test]
fn test_mixed_rotation_warning_precedes_deletion() {
    let policy = PolicyConfig::from_days(90, 60, 60, 7);
    let records = vec![active("a", 85, Some(1)), inactive("i", 120, Some(100))];

    assert_eq!(
        run(records, false, &policy),
        rows(&[
            ("i", "WARN", KeyPendingDeletionConflict, Some(5)),
            ("a", "WARN", KeyPendingRotation, Some(5)),
        ])
    );
}

#[test]
fn test_active_pair_rotation_warning_precedes_deactivation() {
    let policy = PolicyConfig::from_days(90, 100, 7, 7);
    let records = vec![active("old", 100, Some(8)), active("new", 85, Some(1))];

    assert_eq!(
        run(records, false, &policy),
        rows(&[
            ("old", "WARN", KeyPendingDeletionConflict, Some(5)),
            ("new", "WARN", KeyPendingRotation, Some(5)),
        ])
    );
}

#[test]
fn test_zero_warn_lead_time_suppresses_warnings() {
    let policy = PolicyConfig::from_days(90, 7, 7, 0);

    assert_eq!(run(vec![active("k1", 89, Some(1))], false, &policy), rows(&[]));
    assert_eq!(run(vec![inactive("k1", 13, Some(1))], false, &policy), rows(&[]));
    assert_eq!(
        run(vec![active("k1", 90, Some(1))], false, &policy),
        rows(&[("k1", "ROTATE", ExpiredActiveKey, None)])
    );
}

#[test]
fn test_zero_rotation_period_expires_everything() {
    let policy = PolicyConfig::from_days(0, 0, 0, 0);
    let records = vec![active("a", 0, Some(0)), inactive("b", 0, Some(0))];

    assert_eq!(
        run(records, false, &policy),
        rows(&[
            ("b", "DELETE", ExpiredInactiveKeyConflict, None),
            ("a", "ROTATE", ExpiredInactiveKeyConflict, None),
        ])
    );
}

#[test]
fn test_force_flag_ignored_for_inactive_only_sets() {
    let records = vec![inactive("a", 50, Some(49)), inactive("b", 40, Some(39))];
    assert_eq!(run(records, true, &PolicyConfig::default()), rows(&[]));
}
