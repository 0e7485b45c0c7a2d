use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::relieving::checklist::{ClearanceCategory, ClearanceRecord};
use crate::workflows::relieving::domain::{
    FacultyId, FacultyProfile, NewRelievingRequest, RelievingRequest, RequestFilter, RequestId,
    RequestStatus,
};
use crate::workflows::relieving::repository::{
    ChecklistWrite, DirectoryError, FacultyDirectory, InMemoryRelievingRepository,
    RelievingRepository, RepositoryError, StaticFacultyDirectory,
};
use crate::workflows::relieving::{
    relieving_router, ClearanceConfig, ProgressPolicy, RelievingClearanceService,
};

pub(super) type MemoryService =
    RelievingClearanceService<InMemoryRelievingRepository, StaticFacultyDirectory>;

pub(super) fn applied_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date")
}

pub(super) fn submission() -> NewRelievingRequest {
    NewRelievingRequest {
        faculty_id: FacultyId("fac-101".to_string()),
        proposed_last_working_day: NaiveDate::from_ymd_opt(2025, 5, 31),
        reason: "Joining a research institute".to_string(),
        resignation_letter_url: Some("docs/relieving/fac-101/letter.pdf".to_string()),
        applied_date: Some(applied_on()),
    }
}

pub(super) fn directory() -> StaticFacultyDirectory {
    StaticFacultyDirectory::default().with_profile(
        FacultyId("fac-101".to_string()),
        FacultyProfile {
            name: "Dr. Meera Iyer".to_string(),
            employee_id: "EMP-0457".to_string(),
            department_id: "dept-cse".to_string(),
        },
    )
}

pub(super) fn build_service_with(
    policy: ProgressPolicy,
) -> (MemoryService, Arc<InMemoryRelievingRepository>) {
    let repository = Arc::new(InMemoryRelievingRepository::default());
    let service = RelievingClearanceService::new(
        repository.clone(),
        Arc::new(directory()),
        ClearanceConfig {
            progress_policy: policy,
        },
    );
    (service, repository)
}

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryRelievingRepository>) {
    build_service_with(ProgressPolicy::Automatic)
}

pub(super) fn created(service: &MemoryService) -> RelievingRequest {
    service
        .create_request(submission())
        .expect("valid submission is accepted")
}

pub(super) fn set_category<R, F>(
    service: &RelievingClearanceService<R, F>,
    id: &RequestId,
    category: ClearanceCategory,
    values: &[bool],
) where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    for (item, value) in category.items().iter().zip(values) {
        service
            .set_item(id, category, item, *value)
            .expect("declared item on open request");
    }
}

pub(super) fn complete_all<R, F>(service: &RelievingClearanceService<R, F>, id: &RequestId)
where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    for category in ClearanceCategory::ordered() {
        set_category(service, id, category, &vec![true; category.items().len()]);
    }
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    relieving_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

impl RelievingRepository for UnavailableRepository {
    fn insert(&self, _request: RelievingRequest) -> Result<RelievingRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RequestId) -> Result<Option<RelievingRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &RequestFilter) -> Result<Vec<RelievingRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn clearance_records(
        &self,
        _id: &RequestId,
    ) -> Result<Vec<ClearanceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_item(
        &self,
        _id: &RequestId,
        _category: ClearanceCategory,
        _item: &str,
        _value: bool,
        _start_if_pending: bool,
    ) -> Result<ChecklistWrite, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn compare_and_set(
        &self,
        _expected: RequestStatus,
        _request: RelievingRequest,
    ) -> Result<RelievingRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct UnavailableDirectory;

impl FacultyDirectory for UnavailableDirectory {
    fn faculty(&self, _id: &FacultyId) -> Result<Option<FacultyProfile>, DirectoryError> {
        Err(DirectoryError::Unavailable("hr directory timeout".to_string()))
    }
}

/// Store that lets another actor change the request status right after the decision path
/// has read the clearance records, reproducing a lost compare-and-set.
#[derive(Default)]
pub(super) struct InterleavingRepository {
    pub(super) inner: InMemoryRelievingRepository,
    pub(super) interleaved: Mutex<Option<(RequestStatus, RequestStatus)>>,
}

impl InterleavingRepository {
    pub(super) fn interleave(&self, expected: RequestStatus, next: RequestStatus) {
        *self.interleaved.lock().expect("interleave mutex poisoned") = Some((expected, next));
    }
}

impl RelievingRepository for InterleavingRepository {
    fn insert(&self, request: RelievingRequest) -> Result<RelievingRequest, RepositoryError> {
        self.inner.insert(request)
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<RelievingRequest>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self, filter: &RequestFilter) -> Result<Vec<RelievingRequest>, RepositoryError> {
        self.inner.list(filter)
    }

    fn clearance_records(&self, id: &RequestId) -> Result<Vec<ClearanceRecord>, RepositoryError> {
        let records = self.inner.clearance_records(id)?;
        let pending = self
            .interleaved
            .lock()
            .expect("interleave mutex poisoned")
            .take();
        if let Some((expected, next)) = pending {
            let mut request = self.inner.fetch(id)?.ok_or(RepositoryError::NotFound)?;
            request.status = next;
            if next == RequestStatus::Rejected {
                request.admin_remarks = Some("rejected by another reviewer".to_string());
            }
            self.inner.compare_and_set(expected, request)?;
        }
        Ok(records)
    }

    fn upsert_item(
        &self,
        id: &RequestId,
        category: ClearanceCategory,
        item: &str,
        value: bool,
        start_if_pending: bool,
    ) -> Result<ChecklistWrite, RepositoryError> {
        self.inner.upsert_item(id, category, item, value, start_if_pending)
    }

    fn compare_and_set(
        &self,
        expected: RequestStatus,
        request: RelievingRequest,
    ) -> Result<RelievingRequest, RepositoryError> {
        self.inner.compare_and_set(expected, request)
    }
}

/// Store whose status compare-and-set is down; item writes fail too when `fail_item_writes`.
#[derive(Default)]
pub(super) struct DegradedRepository {
    pub(super) inner: InMemoryRelievingRepository,
    pub(super) fail_item_writes: bool,
}

impl RelievingRepository for DegradedRepository {
    fn insert(&self, request: RelievingRequest) -> Result<RelievingRequest, RepositoryError> {
        self.inner.insert(request)
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<RelievingRequest>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self, filter: &RequestFilter) -> Result<Vec<RelievingRequest>, RepositoryError> {
        self.inner.list(filter)
    }

    fn clearance_records(&self, id: &RequestId) -> Result<Vec<ClearanceRecord>, RepositoryError> {
        self.inner.clearance_records(id)
    }

    fn upsert_item(
        &self,
        id: &RequestId,
        category: ClearanceCategory,
        item: &str,
        value: bool,
        start_if_pending: bool,
    ) -> Result<ChecklistWrite, RepositoryError> {
        if self.fail_item_writes {
            return Err(RepositoryError::Unavailable("db down".to_string()));
        }
        self.inner.upsert_item(id, category, item, value, start_if_pending)
    }

    fn compare_and_set(
        &self,
        _expected: RequestStatus,
        _request: RelievingRequest,
    ) -> Result<RelievingRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("db down".to_string()))
    }
}
