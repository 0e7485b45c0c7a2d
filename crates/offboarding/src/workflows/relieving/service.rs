use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::checklist::{ChecklistError, ClearanceCategory};
use super::clearance::{aggregate, checklist_views, CategoryChecklistView, ClearanceSummary};
use super::domain::{
    non_blank, FacultyProfile, NewRelievingRequest, RelievingRequest, RequestFilter, RequestId,
    RequestStatus, ValidationError,
};
use super::gateway::DecisionGateway;
use super::lifecycle::{format_categories, ProgressPolicy, TransitionError};
use super::mutator::{ChecklistMutator, UpdatedCategoryStatus};
use super::repository::{DirectoryError, FacultyDirectory, RelievingRepository, RepositoryError};

/// Workflow settings supplied by the application config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceConfig {
    pub progress_policy: ProgressPolicy,
}

/// Everything a detail screen needs for one request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    pub request: RelievingRequest,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty: Option<FacultyProfile>,
    pub clearance: ClearanceSummary,
    pub checklists: Vec<CategoryChecklistView>,
}

/// Service composing the repository, checklist mutator, and decision gateway.
pub struct RelievingClearanceService<R, F> {
    repository: Arc<R>,
    directory: Arc<F>,
    mutator: ChecklistMutator<R>,
    gateway: DecisionGateway<R>,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("rel-{id:06}"))
}

impl<R, F> RelievingClearanceService<R, F>
where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<F>, config: ClearanceConfig) -> Self {
        let mutator = ChecklistMutator::new(repository.clone(), config.progress_policy);
        let gateway = DecisionGateway::new(repository.clone());

        Self {
            repository,
            directory,
            mutator,
            gateway,
        }
    }

    pub fn mutator(&self) -> &ChecklistMutator<R> {
        &self.mutator
    }

    pub fn gateway(&self) -> &DecisionGateway<R> {
        &self.gateway
    }

    /// Record a new relieving request in `Pending`.
    pub fn create_request(
        &self,
        submission: NewRelievingRequest,
    ) -> Result<RelievingRequest, ClearanceServiceError> {
        let NewRelievingRequest {
            faculty_id,
            proposed_last_working_day,
            reason,
            resignation_letter_url,
            applied_date,
        } = submission;

        if faculty_id.0.trim().is_empty() {
            return Err(ValidationError::MissingFaculty.into());
        }
        let reason = non_blank(Some(reason.as_str())).ok_or(ValidationError::MissingReason)?;
        let proposed_last_working_day =
            proposed_last_working_day.ok_or(ValidationError::MissingLastWorkingDay)?;
        let applied_date = applied_date.unwrap_or_else(|| Local::now().date_naive());
        if proposed_last_working_day < applied_date {
            return Err(ValidationError::LastWorkingDayBeforeApplication {
                applied: applied_date,
                proposed: proposed_last_working_day,
            }
            .into());
        }

        let request = RelievingRequest {
            id: next_request_id(),
            faculty_id,
            applied_date,
            proposed_last_working_day,
            reason,
            resignation_letter_url: non_blank(resignation_letter_url.as_deref()),
            status: RequestStatus::Pending,
            admin_remarks: None,
        };

        let stored = self.repository.insert(request)?;
        info!(
            request_id = %stored.id,
            faculty_id = %stored.faculty_id,
            last_working_day = %stored.proposed_last_working_day,
            "relieving request created"
        );
        Ok(stored)
    }

    pub fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<RelievingRequest>, ClearanceServiceError> {
        Ok(self.repository.list(filter)?)
    }

    /// Request, faculty display data, aggregate clearance, and item-level checklists.
    pub fn request_detail(&self, id: &RequestId) -> Result<RequestDetail, ClearanceServiceError> {
        let request = self
            .repository
            .fetch(id)?
            .ok_or_else(|| ClearanceServiceError::NotFound(id.clone()))?;
        let records = self
            .repository
            .clearance_records(id)
            .map_err(|err| ClearanceServiceError::from_repository(id, err))?;
        let faculty = self.directory.faculty(&request.faculty_id)?;

        Ok(RequestDetail {
            status_label: request.status.label(),
            clearance: aggregate(&records),
            checklists: checklist_views(&records),
            faculty,
            request,
        })
    }

    pub fn set_item(
        &self,
        request_id: &RequestId,
        category: ClearanceCategory,
        item_name: &str,
        value: bool,
    ) -> Result<UpdatedCategoryStatus, ClearanceServiceError> {
        self.mutator.set_item(request_id, category, item_name, value)
    }

    pub fn decide(
        &self,
        request_id: &RequestId,
        target: RequestStatus,
        remarks: Option<&str>,
    ) -> Result<RelievingRequest, ClearanceServiceError> {
        self.gateway.decide(request_id, target, remarks)
    }
}

/// Error raised by the relieving clearance workflow. No variant leaves a partial write behind.
#[derive(Debug, thiserror::Error)]
pub enum ClearanceServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
    #[error("relieving request {0} not found")]
    NotFound(RequestId),
    #[error("relieving request {id} is already {status}; no further changes are accepted")]
    RequestFinalized { id: RequestId, status: RequestStatus },
    #[error("clearance incomplete for: {}", format_categories(.missing))]
    ClearanceIncomplete { missing: Vec<ClearanceCategory> },
    #[error("cannot move a request from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error("relieving request {id} moved to {found} during the operation; re-fetch and retry")]
    ConcurrentModification { id: RequestId, found: RequestStatus },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl ClearanceServiceError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Checklist(ChecklistError::UnknownItem { .. }) => "unknown_checklist_item",
            Self::Checklist(ChecklistError::UnknownCategory(_)) => "unknown_category",
            Self::NotFound(_) => "not_found",
            Self::RequestFinalized { .. } => "request_finalized",
            Self::ClearanceIncomplete { .. } => "clearance_incomplete",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::Repository(_) => "storage_error",
            Self::Directory(_) => "directory_error",
        }
    }

    pub(crate) fn from_transition(id: &RequestId, err: TransitionError) -> Self {
        match err {
            TransitionError::RequestAlreadyFinalized { status } => Self::RequestFinalized {
                id: id.clone(),
                status,
            },
            TransitionError::ClearanceIncomplete { missing } => {
                Self::ClearanceIncomplete { missing }
            }
            TransitionError::RemarksRequired => ValidationError::RemarksRequired.into(),
            TransitionError::InvalidTransition { from, to } => {
                Self::InvalidTransition { from, to }
            }
        }
    }

    /// Attach request context to store failures that carry workflow meaning.
    pub(crate) fn from_repository(id: &RequestId, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(id.clone()),
            RepositoryError::Finalized(status) => Self::RequestFinalized {
                id: id.clone(),
                status,
            },
            RepositoryError::StatusChanged { found, .. } if found.is_terminal() => {
                Self::RequestFinalized {
                    id: id.clone(),
                    status: found,
                }
            }
            RepositoryError::StatusChanged { found, .. } => Self::ConcurrentModification {
                id: id.clone(),
                found,
            },
            other => Self::Repository(other),
        }
    }
}
