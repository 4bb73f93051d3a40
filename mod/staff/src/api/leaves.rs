use axum::{
    Router,
    Extension,
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use serde::Deserialize;

use clinic_core::{Claims, ListParams, Role, ServiceError};

use crate::service::leave::{CreateLeaveInput, LeaveFilters};
use super::{AppState, doc_envelope, list_envelope};

/// Roles allowed to file a leave request.
const FILE_ROLES: &[Role] = &[Role::Doctor, Role::Staff];
/// Roles allowed to approve/reject.
const DECIDE_ROLES: &[Role] = &[Role::Staff];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaves", post(create_leave).get(list_leaves))
        .route("/leaves/{id}", get(get_leave))
        .route("/leaves/{id}/@approve", post(approve_leave))
        .route("/leaves/{id}/@reject", post(reject_leave))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateLeaveBody {
    doctor_id: String,
    from_date: String,
    to_date: String,
    reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaveQuery {
    #[serde(flatten)]
    params: ListParams,
    doctor_id: Option<String>,
    status: Option<String>,
}

async fn create_leave(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateLeaveBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(FILE_ROLES)?;
    let leave = svc.create_leave(CreateLeaveInput {
        doctor_id: body.doctor_id,
        from_date: body.from_date,
        to_date: body.to_date,
        reason: body.reason,
    })?;
    doc_envelope("leaveRequest", &leave)
}

async fn get_leave(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(FILE_ROLES)?;
    doc_envelope("leaveRequest", &svc.get_leave(&id)?)
}

async fn list_leaves(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<LeaveQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(FILE_ROLES)?;
    let filters = LeaveFilters {
        doctor_id: q.doctor_id,
        status: q.status,
    };
    list_envelope("leaveRequests", &svc.list_leaves(&q.params, &filters)?)
}

async fn approve_leave(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(DECIDE_ROLES)?;
    doc_envelope("leaveRequest", &svc.approve_leave(&id, &claims.sub)?)
}

async fn reject_leave(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(DECIDE_ROLES)?;
    doc_envelope("leaveRequest", &svc.reject_leave(&id, &claims.sub)?)
}
