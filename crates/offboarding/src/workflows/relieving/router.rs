use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::checklist::{checklist_schema, ClearanceCategory};
use super::domain::{FacultyId, NewRelievingRequest, RequestFilter, RequestId, RequestStatus};
use super::repository::{FacultyDirectory, RelievingRepository, RepositoryError};
use super::service::{ClearanceServiceError, RelievingClearanceService};

/// Router builder exposing intake, checklist, and decision endpoints.
pub fn relieving_router<R, F>(service: Arc<RelievingClearanceService<R, F>>) -> Router
where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    Router::new()
        .route("/api/v1/relieving/checklists", get(schema_handler))
        .route(
            "/api/v1/relieving/requests",
            post(create_handler::<R, F>).get(list_handler::<R, F>),
        )
        .route(
            "/api/v1/relieving/requests/:request_id",
            get(detail_handler::<R, F>),
        )
        .route(
            "/api/v1/relieving/requests/:request_id/clearance/:category/:item",
            put(set_item_handler::<R, F>),
        )
        .route(
            "/api/v1/relieving/requests/:request_id/decision",
            post(decision_handler::<R, F>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) faculty_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChecklistItemPayload {
    pub(crate) value: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionPayload {
    pub(crate) status: RequestStatus,
    #[serde(default)]
    pub(crate) remarks: Option<String>,
}

pub(crate) async fn schema_handler() -> Response {
    (StatusCode::OK, Json(checklist_schema())).into_response()
}

pub(crate) async fn create_handler<R, F>(
    State(service): State<Arc<RelievingClearanceService<R, F>>>,
    Json(submission): Json<NewRelievingRequest>,
) -> Response
where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    match service.create_request(submission) {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, F>(
    State(service): State<Arc<RelievingClearanceService<R, F>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    let status = match query.status.as_deref().map(str::parse::<RequestStatus>) {
        Some(Ok(status)) => Some(status),
        Some(Err(error)) => {
            let payload = json!({
                "error": error.to_string(),
                "kind": "validation_error",
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
        None => None,
    };
    let filter = RequestFilter {
        status,
        faculty_id: query
            .faculty_id
            .filter(|id| !id.trim().is_empty())
            .map(FacultyId),
    };

    match service.list_requests(&filter) {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<R, F>(
    State(service): State<Arc<RelievingClearanceService<R, F>>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    match service.request_detail(&RequestId(request_id)) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn set_item_handler<R, F>(
    State(service): State<Arc<RelievingClearanceService<R, F>>>,
    Path((request_id, category, item)): Path<(String, String, String)>,
    Json(payload): Json<ChecklistItemPayload>,
) -> Response
where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    let category = match category.parse::<ClearanceCategory>() {
        Ok(category) => category,
        Err(error) => return error_response(error.into()),
    };

    match service.set_item(&RequestId(request_id), category, &item, payload.value) {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<R, F>(
    State(service): State<Arc<RelievingClearanceService<R, F>>>,
    Path(request_id): Path<String>,
    Json(payload): Json<DecisionPayload>,
) -> Response
where
    R: RelievingRepository + 'static,
    F: FacultyDirectory + 'static,
{
    let DecisionPayload { status, remarks } = payload;
    match service.decide(&RequestId(request_id), status, remarks.as_deref()) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn status_for(error: &ClearanceServiceError) -> StatusCode {
    match error {
        ClearanceServiceError::Validation(_) | ClearanceServiceError::Checklist(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ClearanceServiceError::NotFound(_)
        | ClearanceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ClearanceServiceError::RequestFinalized { .. }
        | ClearanceServiceError::ClearanceIncomplete { .. }
        | ClearanceServiceError::InvalidTransition { .. }
        | ClearanceServiceError::ConcurrentModification { .. }
        | ClearanceServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ClearanceServiceError::Repository(_) | ClearanceServiceError::Directory(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub(crate) fn error_response(error: ClearanceServiceError) -> Response {
    let status = status_for(&error);
    let mut payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });
    if let ClearanceServiceError::ClearanceIncomplete { missing } = &error {
        payload["missing"] = json!(missing);
    }
    (status, Json(payload)).into_response()
}
