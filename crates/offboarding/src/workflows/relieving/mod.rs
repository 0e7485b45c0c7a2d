//! Faculty offboarding clearance: relieving requests, the four department checklists that
//! gate them, and the decision path that approves or rejects a request.
//!
//! Checklist writes go through [`ChecklistMutator`]; status changes go through
//! [`DecisionGateway`], which aggregates the latest clearance records at the moment of the
//! decision. Once a request is approved or rejected neither accepts further changes.

pub mod checklist;
pub mod clearance;
pub mod domain;
pub mod gateway;
pub mod lifecycle;
pub mod mutator;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use checklist::{
    checklist_schema, resolve, CategoryStatus, ChecklistError, ChecklistSchemaEntry,
    ClearanceCategory, ClearanceRecord, ItemProgress,
};
pub use clearance::{aggregate, checklist_views, CategoryChecklistView, ClearanceSummary};
pub use domain::{
    FacultyId, FacultyProfile, NewRelievingRequest, RelievingRequest, RequestFilter, RequestId,
    RequestStatus, ValidationError,
};
pub use gateway::DecisionGateway;
pub use lifecycle::{ProgressPolicy, RequestLifecycle, TransitionError};
pub use mutator::{ChecklistMutator, UpdatedCategoryStatus};
pub use repository::{
    ChecklistWrite, DirectoryError, FacultyDirectory, InMemoryRelievingRepository,
    RelievingRepository, RepositoryError, StaticFacultyDirectory,
};
pub use router::relieving_router;
pub use service::{ClearanceConfig, ClearanceServiceError, RelievingClearanceService, RequestDetail};
