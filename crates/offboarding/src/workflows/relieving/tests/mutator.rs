use super::common::*;
use std::sync::Arc;

use crate::workflows::relieving::checklist::{CategoryStatus, ChecklistError, ClearanceCategory};
use crate::workflows::relieving::domain::{RequestId, RequestStatus};
use crate::workflows::relieving::repository::{RelievingRepository, RepositoryError};
use crate::workflows::relieving::{
    ClearanceConfig, ClearanceServiceError, ProgressPolicy, RelievingClearanceService,
};

#[test]
fn set_item_returns_fresh_category_status() {
    let (service, _) = build_service();
    let request = created(&service);

    let first = service
        .set_item(&request.id, ClearanceCategory::Academic, "syllabus_completed", true)
        .expect("declared item");
    assert_eq!(first.status, CategoryStatus::InProgress);
    assert_eq!((first.completed, first.total), (1, 3));
    assert_eq!(first.items.len(), 3);

    service
        .set_item(&request.id, ClearanceCategory::Academic, "internal_marks_uploaded", true)
        .expect("declared item");
    let last = service
        .set_item(&request.id, ClearanceCategory::Academic, "lab_records_submitted", true)
        .expect("declared item");
    assert_eq!(last.status, CategoryStatus::Completed);
    assert_eq!(last.status_label, "Completed");

    let reverted = service
        .set_item(&request.id, ClearanceCategory::Academic, "lab_records_submitted", false)
        .expect("items can be unchecked while open");
    assert_eq!(reverted.status, CategoryStatus::InProgress);
}

#[test]
fn unknown_items_never_reach_the_store() {
    let (service, repository) = build_service();
    let request = created(&service);

    match service.set_item(&request.id, ClearanceCategory::Library, "laptop_returned", true) {
        Err(ClearanceServiceError::Checklist(ChecklistError::UnknownItem { category, item })) => {
            assert_eq!(category, ClearanceCategory::Library);
            assert_eq!(item, "laptop_returned");
        }
        other => panic!("expected unknown item, got {other:?}"),
    }

    assert!(repository
        .clearance_records(&request.id)
        .expect("records")
        .is_empty());
    let stored = repository.fetch(&request.id).expect("fetch").expect("present");
    assert_eq!(stored.status, RequestStatus::Pending);
}

#[test]
fn set_item_on_unknown_request_is_not_found() {
    let (service, _) = build_service();

    match service.set_item(
        &RequestId("rel-ghost".to_string()),
        ClearanceCategory::Asset,
        "id_card_returned",
        true,
    ) {
        Err(ClearanceServiceError::NotFound(id)) => assert_eq!(id.0, "rel-ghost"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn first_write_starts_clearance_under_automatic_policy() {
    let (service, repository) = build_service_with(ProgressPolicy::Automatic);
    let request = created(&service);

    let updated = service
        .set_item(&request.id, ClearanceCategory::Financial, "advance_settled", false)
        .expect("declared item");

    assert_eq!(updated.request_status, RequestStatus::InProgress);
    assert_eq!(updated.status, CategoryStatus::NotStarted);
    let stored = repository.fetch(&request.id).expect("fetch").expect("present");
    assert_eq!(stored.status, RequestStatus::InProgress);
}

#[test]
fn manual_policy_leaves_status_to_reviewers() {
    let (service, repository) = build_service_with(ProgressPolicy::Manual);
    let request = created(&service);

    let updated = service
        .set_item(&request.id, ClearanceCategory::Asset, "laptop_returned", true)
        .expect("declared item");
    assert_eq!(updated.request_status, RequestStatus::Pending);
    assert_eq!(service.mutator().policy(), ProgressPolicy::Manual);

    let started = service
        .decide(&request.id, RequestStatus::InProgress, None)
        .expect("explicit start");
    assert_eq!(started.status, RequestStatus::InProgress);
    let stored = repository.fetch(&request.id).expect("fetch").expect("present");
    assert_eq!(stored.status, RequestStatus::InProgress);
}

#[test]
fn finalized_requests_refuse_checklist_writes() {
    for terminal in [RequestStatus::Approved, RequestStatus::Rejected] {
        let (service, repository) = build_service();
        let request = created(&service);
        complete_all(&service, &request.id);
        service
            .decide(&request.id, terminal, Some("closing"))
            .expect("decision");
        let before = repository
            .clearance_records(&request.id)
            .expect("records");

        match service.set_item(&request.id, ClearanceCategory::Library, "fines_paid", false) {
            Err(ClearanceServiceError::RequestFinalized { status, .. }) => {
                assert_eq!(status, terminal)
            }
            other => panic!("expected finalized, got {other:?}"),
        }

        assert_eq!(
            repository.clearance_records(&request.id).expect("records"),
            before
        );
    }
}

#[test]
fn automatic_start_commits_with_the_item_write() {
    let repository = Arc::new(DegradedRepository::default());
    let service = RelievingClearanceService::new(
        repository.clone(),
        Arc::new(directory()),
        ClearanceConfig::default(),
    );
    let request = service.create_request(submission()).expect("valid");

    let updated = service
        .set_item(&request.id, ClearanceCategory::Library, "books_returned", true)
        .expect("item write carries the start");

    assert_eq!(updated.request_status, RequestStatus::InProgress);
    let stored = repository.fetch(&request.id).expect("fetch").expect("present");
    assert_eq!(stored.status, RequestStatus::InProgress);
}

#[test]
fn failed_checklist_write_changes_nothing() {
    let repository = Arc::new(DegradedRepository {
        fail_item_writes: true,
        ..DegradedRepository::default()
    });
    let service = RelievingClearanceService::new(
        repository.clone(),
        Arc::new(directory()),
        ClearanceConfig::default(),
    );
    let request = service.create_request(submission()).expect("valid");

    match service.set_item(&request.id, ClearanceCategory::Library, "books_returned", true) {
        Err(ClearanceServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert_eq!(reason, "db down")
        }
        other => panic!("expected storage failure, got {other:?}"),
    }

    let stored = repository.fetch(&request.id).expect("fetch").expect("present");
    assert_eq!(stored.status, RequestStatus::Pending);
    assert!(repository
        .clearance_records(&request.id)
        .expect("records")
        .is_empty());
}
