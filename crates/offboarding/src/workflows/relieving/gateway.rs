use std::sync::Arc;

use tracing::{info, warn};

use super::clearance::aggregate;
use super::domain::{RelievingRequest, RequestId, RequestStatus};
use super::lifecycle::RequestLifecycle;
use super::repository::RelievingRepository;
use super::service::ClearanceServiceError;

/// Single entry point for status changes.
///
/// Every call re-reads the clearance records and aggregates them before consulting the
/// lifecycle, then persists with compare-and-set against the status it started from. Two
/// concurrent decisions cannot both succeed.
pub struct DecisionGateway<R> {
    repository: Arc<R>,
    lifecycle: RequestLifecycle,
}

impl<R> DecisionGateway<R>
where
    R: RelievingRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            lifecycle: RequestLifecycle,
        }
    }

    pub fn decide(
        &self,
        request_id: &RequestId,
        target: RequestStatus,
        remarks: Option<&str>,
    ) -> Result<RelievingRequest, ClearanceServiceError> {
        let request = self
            .repository
            .fetch(request_id)?
            .ok_or_else(|| ClearanceServiceError::NotFound(request_id.clone()))?;

        let records = self
            .repository
            .clearance_records(request_id)
            .map_err(|err| ClearanceServiceError::from_repository(request_id, err))?;
        let clearance = aggregate(&records);

        let next = self
            .lifecycle
            .transition(&request, target, remarks, &clearance)
            .map_err(|err| {
                warn!(
                    request_id = %request_id,
                    from = %request.status,
                    to = %target,
                    error = %err,
                    "decision refused"
                );
                ClearanceServiceError::from_transition(request_id, err)
            })?;

        let stored = self
            .repository
            .compare_and_set(request.status, next)
            .map_err(|err| {
                warn!(request_id = %request_id, error = %err, "decision lost a concurrent update");
                ClearanceServiceError::from_repository(request_id, err)
            })?;

        info!(
            request_id = %stored.id,
            from = %request.status,
            to = %stored.status,
            "relieving request decided"
        );
        Ok(stored)
    }
}
