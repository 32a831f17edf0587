#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{part_box, snapshot};
use modeldelta_core::diff::diff;
use modeldelta_core::errors::{ExError, ExErrorKind, SnapshotError};
use modeldelta_core::logging_facility::test_capture::init_test_capture;
use modeldelta_core::{log_op_end, log_op_error, log_op_start, EntityId};
use modeldelta_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_CREATED, FIELD_DELETED, FIELD_DOCUMENT,
    FIELD_DURATION_MS, FIELD_ENTITY_ID, FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_MODIFIED,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, document = "Assembly");

    let starts = capture.events_for_op(op_name);
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(starts[0].field(FIELD_DOCUMENT), Some("Assembly"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let ends: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(ends.len(), 1, "Should have exactly one end event");
    assert_eq!(ends[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_converts_domain_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = SnapshotError::ObjectCountMismatch {
        declared: 3,
        actual: 2,
    };
    log_op_error!(op_name, err, duration_ms = 10);

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let event = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");
    assert_eq!(event.field(FIELD_ERR_CODE), Some("ERR_INVALID_SNAPSHOT"));
}

#[test]
fn test_log_op_error_with_ex_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_4";

    let err = ExError::new(ExErrorKind::Io).with_message("disk full");
    log_op_error!(op_name, err, duration_ms = 1, path = "/tmp/x");

    let event = capture
        .events_for_op(op_name)
        .into_iter()
        .next()
        .expect("Should have error event");
    assert_eq!(event.field(FIELD_ERR_CODE), Some("ERR_IO"));
    assert_eq!(event.field("path"), Some("/tmp/x"));
}

#[test]
fn test_diff_logs_counts() {
    let capture = init_test_capture();

    let after = snapshot(
        (0..7)
            .map(|i| part_box(&format!("Counted{}", i), "Counted", 1.0, 1.0, 1.0))
            .collect(),
    );
    diff(None, Some(&after), "").unwrap();

    let found = capture.count_events(|e| {
        e.op.as_deref() == Some("diff_snapshots")
            && e.event.as_deref() == Some(EVENT_END)
            && e.field(FIELD_CREATED) == Some("7")
            && e.field(FIELD_MODIFIED) == Some("0")
            && e.field(FIELD_DELETED) == Some("0")
            && e.field(FIELD_DURATION_MS).is_some()
    });
    assert!(found >= 1, "diff end event with created=7 not captured");
}

#[test]
fn test_diff_logs_duplicate_identity() {
    let capture = init_test_capture();

    let dup = snapshot(vec![
        part_box("DupLogged", "A", 1.0, 1.0, 1.0),
        part_box("DupLogged", "B", 1.0, 1.0, 1.0),
    ]);
    let err = diff(Some(&dup), None, "").unwrap_err();
    assert_eq!(err.entity_id(), Some(EntityId::new("DupLogged").as_str()));

    let found = capture.count_events(|e| {
        e.op.as_deref() == Some("diff_snapshots")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field(FIELD_ENTITY_ID) == Some("DupLogged")
            && e.field(FIELD_ERR_CODE) == Some("ERR_DUPLICATE_IDENTITY")
            && e.field(FIELD_ERR_KIND).is_some()
    });
    assert_eq!(found, 1);
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}
