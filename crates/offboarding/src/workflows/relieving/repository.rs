use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::checklist::{ClearanceCategory, ClearanceRecord};
use super::domain::{
    FacultyId, FacultyProfile, RelievingRequest, RequestFilter, RequestId, RequestStatus,
};

/// Storage abstraction over relieving requests and their clearance records.
///
/// Writes that must not overtake a decision are conditional: `upsert_item` refuses to touch a
/// request that is terminal at write time, and `compare_and_set` only replaces a request whose
/// stored status still matches what the caller read. An item write that also starts the
/// clearance commits both changes or neither.
pub trait RelievingRepository: Send + Sync {
    fn insert(&self, request: RelievingRequest) -> Result<RelievingRequest, RepositoryError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<RelievingRequest>, RepositoryError>;
    fn list(&self, filter: &RequestFilter) -> Result<Vec<RelievingRequest>, RepositoryError>;
    fn clearance_records(&self, id: &RequestId) -> Result<Vec<ClearanceRecord>, RepositoryError>;
    /// Set one item, creating the category record with every item unchecked on first touch.
    /// With `start_if_pending`, a request still `Pending` moves to `InProgress` in the same write.
    fn upsert_item(
        &self,
        id: &RequestId,
        category: ClearanceCategory,
        item: &str,
        value: bool,
        start_if_pending: bool,
    ) -> Result<ChecklistWrite, RepositoryError>;
    fn compare_and_set(
        &self,
        expected: RequestStatus,
        request: RelievingRequest,
    ) -> Result<RelievingRequest, RepositoryError>;
}

/// Outcome of a committed checklist write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistWrite {
    pub record: ClearanceRecord,
    pub request_status: RequestStatus,
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("request is {0} and can no longer be modified")]
    Finalized(RequestStatus),
    #[error("request status changed from {expected} to {found}")]
    StatusChanged {
        expected: RequestStatus,
        found: RequestStatus,
    },
    #[error("invalid write: {0}")]
    Invalid(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// External faculty directory, consulted for display only.
pub trait FacultyDirectory: Send + Sync {
    fn faculty(&self, id: &FacultyId) -> Result<Option<FacultyProfile>, DirectoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("faculty directory unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
struct StoredRequest {
    request: RelievingRequest,
    records: BTreeMap<ClearanceCategory, ClearanceRecord>,
}

/// Process-local store used by the API service and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRelievingRepository {
    entries: Arc<Mutex<HashMap<RequestId, StoredRequest>>>,
}

impl InMemoryRelievingRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RequestId, StoredRequest>>, RepositoryError> {
        self.entries
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl RelievingRepository for InMemoryRelievingRepository {
    fn insert(&self, request: RelievingRequest) -> Result<RelievingRequest, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(
            request.id.clone(),
            StoredRequest {
                request: request.clone(),
                records: BTreeMap::new(),
            },
        );
        Ok(request)
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<RelievingRequest>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).map(|entry| entry.request.clone()))
    }

    fn list(&self, filter: &RequestFilter) -> Result<Vec<RelievingRequest>, RepositoryError> {
        let guard = self.lock()?;
        let mut requests: Vec<RelievingRequest> = guard
            .values()
            .filter(|entry| filter.matches(&entry.request))
            .map(|entry| entry.request.clone())
            .collect();
        requests.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(requests)
    }

    fn clearance_records(&self, id: &RequestId) -> Result<Vec<ClearanceRecord>, RepositoryError> {
        let guard = self.lock()?;
        let entry = guard.get(id).ok_or(RepositoryError::NotFound)?;
        Ok(entry.records.values().cloned().collect())
    }

    fn upsert_item(
        &self,
        id: &RequestId,
        category: ClearanceCategory,
        item: &str,
        value: bool,
        start_if_pending: bool,
    ) -> Result<ChecklistWrite, RepositoryError> {
        let mut guard = self.lock()?;
        let entry = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if entry.request.status.is_terminal() {
            return Err(RepositoryError::Finalized(entry.request.status));
        }

        let mut record = entry
            .records
            .get(&category)
            .cloned()
            .unwrap_or_else(|| ClearanceRecord::new(id.clone(), category));
        record
            .set(item, value)
            .map_err(|err| RepositoryError::Invalid(err.to_string()))?;
        entry.records.insert(category, record.clone());
        if start_if_pending && entry.request.status == RequestStatus::Pending {
            entry.request.status = RequestStatus::InProgress;
        }

        Ok(ChecklistWrite {
            record,
            request_status: entry.request.status,
        })
    }

    fn compare_and_set(
        &self,
        expected: RequestStatus,
        request: RelievingRequest,
    ) -> Result<RelievingRequest, RepositoryError> {
        let mut guard = self.lock()?;
        let entry = guard.get_mut(&request.id).ok_or(RepositoryError::NotFound)?;
        if entry.request.status != expected {
            return Err(RepositoryError::StatusChanged {
                expected,
                found: entry.request.status,
            });
        }
        entry.request = request.clone();
        Ok(request)
    }
}

/// Fixed-roster directory for demos and local runs.
#[derive(Debug, Default, Clone)]
pub struct StaticFacultyDirectory {
    profiles: HashMap<FacultyId, FacultyProfile>,
}

impl StaticFacultyDirectory {
    pub fn with_profile(mut self, id: FacultyId, profile: FacultyProfile) -> Self {
        self.profiles.insert(id, profile);
        self
    }
}

impl FacultyDirectory for StaticFacultyDirectory {
    fn faculty(&self, id: &FacultyId) -> Result<Option<FacultyProfile>, DirectoryError> {
        Ok(self.profiles.get(id).cloned())
    }
}
