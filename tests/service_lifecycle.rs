//! Lifecycle tests for the task service: create/read round-trips, full-replace
//! updates, progress ordering, and the delete cascade.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use studyplan::error::PlannerError;
use studyplan::store::types::now_epoch_secs;
use studyplan::{Db, TaskFields, TaskService};

fn service() -> TaskService {
    TaskService::new(Db::open_in_memory().expect("open in-memory db"))
}

fn fields(subject: &str, day: &str) -> TaskFields {
    TaskFields {
        subject: subject.to_owned(),
        duration: 60,
        task_date: day.parse().unwrap(),
        notes: Some("revision".to_owned()),
        confidence_level: Some(80.0),
    }
}

#[test]
fn get_after_create_returns_the_same_values() {
    let svc = service();
    let f = fields("Math", "2024-01-10");
    let id = svc.add_task(&f).unwrap();

    let got = svc.get_task_with_progress(id).unwrap();
    assert_eq!(got.task.subject, f.subject);
    assert_eq!(got.task.duration, f.duration);
    assert_eq!(got.task.task_date, f.task_date);
    assert_eq!(got.task.notes, f.notes);
    assert_eq!(got.task.confidence_level, f.confidence_level);
    assert_eq!(got.progress, 0);
}

#[test]
fn delete_removes_task_and_all_progress() {
    let svc = service();
    let id = svc.add_task(&fields("Math", "2024-01-10")).unwrap();
    svc.update_progress(id, 25).unwrap();
    svc.update_progress(id, 75).unwrap();
    svc.update_progress(id, 100).unwrap();

    svc.delete_task(id).unwrap();

    assert!(matches!(
        svc.get_task_with_progress(id),
        Err(PlannerError::NotFound(_))
    ));
    assert!(svc.progress_store().history(id).unwrap().is_empty());
}

#[test]
fn latest_progress_orders_by_timestamp_not_write_order() {
    let svc = service();
    let id = svc.add_task(&fields("Math", "2024-01-10")).unwrap();

    // Write the newer timestamp first: latest must still be 90.
    let now = now_epoch_secs();
    svc.progress_store().record_at(id, 90, now).unwrap();
    svc.progress_store().record_at(id, 10, now - 3600).unwrap();

    let got = svc.get_task_with_progress(id).unwrap();
    assert_eq!(got.progress, 90);
}

#[test]
fn update_replaces_every_mutable_field() {
    let svc = service();
    let id = svc.add_task(&fields("Math", "2024-01-10")).unwrap();

    svc.update_task(
        id,
        &TaskFields {
            subject: "Physics".to_owned(),
            duration: 120,
            task_date: "2024-02-01".parse().unwrap(),
            notes: None,
            confidence_level: None,
        },
    )
    .unwrap();

    let got = svc.get_task_with_progress(id).unwrap();
    assert_eq!(got.task.subject, "Physics");
    assert_eq!(got.task.duration, 120);
    assert!(got.task.notes.is_none());
    assert!(got.task.confidence_level.is_none());
}

#[test]
fn update_with_out_of_range_confidence_is_rejected() {
    let svc = service();
    let id = svc.add_task(&fields("Math", "2024-01-10")).unwrap();

    let mut f = fields("Math", "2024-01-10");
    f.confidence_level = Some(150.0);
    assert!(matches!(
        svc.update_task(id, &f),
        Err(PlannerError::Validation(_))
    ));

    // The stored task is untouched.
    let got = svc.get_task_with_progress(id).unwrap();
    assert_eq!(got.task.confidence_level, Some(80.0));
}

#[test]
fn progress_for_unknown_task_is_rejected_without_orphan_rows() {
    let svc = service();
    assert!(matches!(
        svc.update_progress(42, 50),
        Err(PlannerError::NotFound(_))
    ));
    assert!(svc.progress_store().history(42).unwrap().is_empty());
}

#[test]
fn listing_matches_store_ordering() {
    let svc = service();
    svc.add_task(&fields("Early", "2024-01-02")).unwrap();
    svc.add_task(&fields("Late", "2024-01-20")).unwrap();

    let listed = svc.list_tasks_with_progress(None, None).unwrap();
    let subjects: Vec<&str> = listed.iter().map(|t| t.task.subject.as_str()).collect();
    assert_eq!(subjects, ["Late", "Early"]);
}

#[test]
fn persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.db");

    let id = {
        let svc = TaskService::new(Db::open(&path).unwrap());
        let id = svc.add_task(&fields("Math", "2024-01-10")).unwrap();
        svc.update_progress(id, 60).unwrap();
        id
    };

    let svc = TaskService::new(Db::open(&path).unwrap());
    let got = svc.get_task_with_progress(id).unwrap();
    assert_eq!(got.task.subject, "Math");
    assert_eq!(got.progress, 60);
}
