//! Integration tests for writing recurrence rules to the database.

mod common;

use std::time::Duration;

use chrono::{TimeZone, Utc};
use common::Fixture;
use rusqlite::types::Value;
use things_db::repeat::ResolvedTarget;
use things_db::{
    apply_repeat, wait_for_created, Error, RepeatAction, RepeatMode, RepeatSpec, RepeatUnit,
    SqliteStore, StoreError, SystemClock, WaitPolicy,
};
use things_model::{RecurrenceRule, TaskKind, ThingsDate};

fn weekly_spec() -> RepeatSpec<Utc> {
    // 2026-01-06 is a Tuesday.
    let anchor = Utc.with_ymd_and_hms(2026, 1, 6, 8, 0, 0).unwrap();
    RepeatSpec::anchored(RepeatMode::Schedule, RepeatUnit::Week, 2, anchor)
}

fn packed(y: i64, m: i64, d: i64) -> Value {
    Value::Integer((y << 16) | (m << 12) | (d << 7))
}

#[test]
fn test_apply_writes_rule_and_moves_to_someday() {
    let fx = Fixture::sample();
    let store = SqliteStore::open_writable(&fx.path).expect("open store");

    let resolved = apply_repeat(
        &store,
        "T-LAMP",
        TaskKind::Todo,
        &RepeatAction::Set(weekly_spec()),
    )
    .expect("apply repeat");
    assert_eq!(
        resolved,
        ResolvedTarget {
            id: "T-LAMP".to_string(),
            used_template: false
        }
    );

    let Value::Blob(blob) = fx.column("T-LAMP", "rt1_recurrenceRule") else {
        panic!("rule should be stored as a blob");
    };
    let rule = RecurrenceRule::from_plist_bytes(&blob).expect("decode rule");
    assert_eq!(rule.fu, 256);
    assert_eq!(rule.fa, 2);
    assert_eq!(rule.tp, 0);

    assert_eq!(fx.column("T-LAMP", "rt1_instanceCreationStartDate"), packed(2026, 1, 7));
    assert_eq!(fx.column("T-LAMP", "rt1_nextInstanceStartDate"), packed(2026, 1, 20));
    assert_eq!(fx.column("T-LAMP", "rt1_instanceCreationPaused"), Value::Integer(0));
    assert_eq!(fx.column("T-LAMP", "rt1_afterCompletionReferenceDate"), Value::Null);
    assert_eq!(fx.column("T-LAMP", "start"), Value::Integer(2));
    assert_eq!(fx.column("T-LAMP", "startDate"), Value::Null);
    assert_eq!(fx.column("T-LAMP", "startBucket"), Value::Integer(0));
    assert!(matches!(
        fx.column("T-LAMP", "userModificationDate"),
        Value::Real(v) if v > 1_735_689_600.0
    ));
}

#[test]
fn test_apply_with_deadline_offset_sets_sentinel() {
    let fx = Fixture::sample();
    fx.execute("UPDATE TMTask SET deadlineSuppressionDate = 5 WHERE uuid = 'T-SEEDS'");
    let store = SqliteStore::open_writable(&fx.path).expect("open store");

    apply_repeat(
        &store,
        "T-SEEDS",
        TaskKind::Todo,
        &RepeatAction::Set(weekly_spec().with_deadline_offset(1)),
    )
    .expect("apply repeat");

    assert_eq!(
        fx.column("T-SEEDS", "deadline"),
        Value::Integer(ThingsDate::far_future().raw())
    );
    assert_eq!(fx.column("T-SEEDS", "deadlineSuppressionDate"), Value::Null);
}

#[test]
fn test_apply_without_deadline_offset_keeps_deadline() {
    let fx = Fixture::sample();
    let store = SqliteStore::open_writable(&fx.path).expect("open store");

    apply_repeat(
        &store,
        "T-SEEDS",
        TaskKind::Todo,
        &RepeatAction::Set(weekly_spec()),
    )
    .expect("apply repeat");

    assert_eq!(fx.column("T-SEEDS", "deadline"), packed(2025, 3, 1));
}

#[test]
fn test_clear_removes_rule_and_deadline() {
    let fx = Fixture::sample();
    let store = SqliteStore::open_writable(&fx.path).expect("open store");
    apply_repeat(
        &store,
        "T-SEEDS",
        TaskKind::Todo,
        &RepeatAction::Set(weekly_spec().with_deadline_offset(0)),
    )
    .expect("apply repeat");

    apply_repeat::<_, Utc>(&store, "T-SEEDS", TaskKind::Todo, &RepeatAction::Clear)
        .expect("clear repeat");

    for column in [
        "rt1_recurrenceRule",
        "rt1_instanceCreationStartDate",
        "rt1_afterCompletionReferenceDate",
        "rt1_nextInstanceStartDate",
        "deadline",
        "deadlineSuppressionDate",
    ] {
        assert_eq!(fx.column("T-SEEDS", column), Value::Null, "{column}");
    }
    assert_eq!(fx.column("T-SEEDS", "rt1_instanceCreationPaused"), Value::Integer(0));
    assert_eq!(fx.column("T-SEEDS", "rt1_instanceCreationCount"), Value::Integer(0));
}

#[test]
fn test_instance_updates_its_template() {
    let fx = Fixture::sample();
    fx.execute(
        "INSERT INTO TMTask (uuid, type, title, rt1_repeatingTemplate) \
         VALUES ('T-INSTANCE', 0, 'Water plants', 'T-WEEKLY')",
    );
    let store = SqliteStore::open_writable(&fx.path).expect("open store");

    let resolved = apply_repeat::<_, Utc>(&store, "T-INSTANCE", TaskKind::Todo, &RepeatAction::Clear)
        .expect("clear repeat");

    assert_eq!(resolved.id, "T-WEEKLY");
    assert!(resolved.used_template);
    assert_eq!(fx.column("T-WEEKLY", "rt1_recurrenceRule"), Value::Null);
}

#[test]
fn test_rejects_wrong_kind_and_completed_items() {
    let fx = Fixture::sample();
    let store = SqliteStore::open_writable(&fx.path).expect("open store");

    let err = apply_repeat(
        &store,
        "P-GARDEN",
        TaskKind::Todo,
        &RepeatAction::Set(weekly_spec()),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "item type mismatch for repeat update");

    let err = apply_repeat(
        &store,
        "T-DONE",
        TaskKind::Todo,
        &RepeatAction::Set(weekly_spec()),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "repeating rules require an incomplete item");
    assert_eq!(fx.column("T-DONE", "rt1_recurrenceRule"), Value::Null);
}

#[test]
fn test_project_can_repeat() {
    let fx = Fixture::sample();
    let store = SqliteStore::open_writable(&fx.path).expect("open store");

    apply_repeat(
        &store,
        "P-GARDEN",
        TaskKind::Project,
        &RepeatAction::Set(weekly_spec()),
    )
    .expect("apply repeat");

    assert!(matches!(
        fx.column("P-GARDEN", "rt1_recurrenceRule"),
        Value::Blob(_)
    ));
}

#[test]
fn test_read_only_store_refuses_writes() {
    let fx = Fixture::sample();
    let store = SqliteStore::open(&fx.path).expect("open store");

    let err = apply_repeat(
        &store,
        "T-LAMP",
        TaskKind::Todo,
        &RepeatAction::Set(weekly_spec()),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Store(StoreError::Sqlite(_))));
    assert_eq!(fx.column("T-LAMP", "rt1_recurrenceRule"), Value::Null);
}

#[test]
fn test_unknown_id_is_not_found() {
    let fx = Fixture::sample();
    let store = SqliteStore::open_writable(&fx.path).expect("open store");

    let err = apply_repeat::<_, Utc>(&store, "missing", TaskKind::Todo, &RepeatAction::Clear)
        .unwrap_err();
    assert_eq!(err.to_string(), "task not found: missing");
}

#[test]
fn test_wait_then_repeat_created_item() {
    let fx = Fixture::sample();
    let store = SqliteStore::open_writable(&fx.path).expect("open store");
    let policy = WaitPolicy {
        interval: Duration::from_millis(1),
        timeout: Duration::ZERO,
    };

    let id = wait_for_created(&store, &SystemClock, &policy, "buy milk", TaskKind::Todo, 0.0)
        .expect("wait for created");
    assert_eq!(id, "T-MILK");

    apply_repeat(&store, &id, TaskKind::Todo, &RepeatAction::Set(weekly_spec()))
        .expect("apply repeat");
    assert!(matches!(fx.column("T-MILK", "rt1_recurrenceRule"), Value::Blob(_)));
}
