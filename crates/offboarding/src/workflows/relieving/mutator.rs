use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::checklist::{CategoryStatus, ClearanceCategory};
use super::domain::{RequestId, RequestStatus};
use super::lifecycle::{ProgressPolicy, RequestLifecycle};
use super::repository::{ChecklistWrite, RelievingRepository};
use super::service::ClearanceServiceError;

/// Category state returned after a checklist write so callers can render progress directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedCategoryStatus {
    pub request_id: RequestId,
    pub category: ClearanceCategory,
    pub status: CategoryStatus,
    pub status_label: &'static str,
    pub completed: usize,
    pub total: usize,
    pub items: BTreeMap<String, bool>,
    pub request_status: RequestStatus,
}

/// Writes individual checklist items on behalf of department staff.
pub struct ChecklistMutator<R> {
    repository: Arc<R>,
    lifecycle: RequestLifecycle,
    policy: ProgressPolicy,
}

impl<R> ChecklistMutator<R>
where
    R: RelievingRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: ProgressPolicy) -> Self {
        Self {
            repository,
            lifecycle: RequestLifecycle,
            policy,
        }
    }

    pub fn policy(&self) -> ProgressPolicy {
        self.policy
    }

    /// Set one item and return the category's freshly resolved status.
    ///
    /// Item names are checked against the category schema before anything is read. A terminal
    /// request is refused here and again by the store at write time. Under the automatic policy
    /// the store starts a `Pending` request in the same write, so a storage failure leaves
    /// neither change behind.
    pub fn set_item(
        &self,
        request_id: &RequestId,
        category: ClearanceCategory,
        item_name: &str,
        value: bool,
    ) -> Result<UpdatedCategoryStatus, ClearanceServiceError> {
        let item = category.item(item_name)?;

        let request = self
            .repository
            .fetch(request_id)?
            .ok_or_else(|| ClearanceServiceError::NotFound(request_id.clone()))?;
        if request.status.is_terminal() {
            return Err(ClearanceServiceError::RequestFinalized {
                id: request.id,
                status: request.status,
            });
        }

        let start_if_pending = self
            .lifecycle
            .starts_on_checklist_write(self.policy, request.status);
        let ChecklistWrite {
            record,
            request_status,
        } = self
            .repository
            .upsert_item(request_id, category, item, value, start_if_pending)
            .map_err(|err| ClearanceServiceError::from_repository(request_id, err))?;
        debug!(
            request_id = %request_id,
            category = category.key(),
            item,
            value,
            "checklist item updated"
        );
        if start_if_pending && request_status == RequestStatus::InProgress {
            info!(request_id = %request_id, "clearance started");
        }

        let progress = record.progress();
        let status = record.status();
        Ok(UpdatedCategoryStatus {
            request_id: request_id.clone(),
            category,
            status,
            status_label: status.label(),
            completed: progress.completed,
            total: progress.total,
            items: record.items,
            request_status,
        })
    }
}
