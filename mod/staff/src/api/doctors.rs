use axum::{
    Router,
    Extension,
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use serde::Deserialize;

use clinic_core::{Claims, ListParams, Role, ServiceError};

use crate::service::doctor::{CreateDoctorInput, DoctorFilters};
use super::{AppState, doc_envelope, list_envelope, ok_status};

/// Roles allowed to create/update/delete doctor records.
const WRITE_ROLES: &[Role] = &[Role::Staff];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/doctors", post(create_doctor).get(list_doctors))
        .route(
            "/doctors/{id}",
            get(get_doctor).put(update_doctor).delete(delete_doctor),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDoctorBody {
    name: String,
    email: Option<String>,
    specialization: String,
    department: String,
    phone: Option<String>,
    consultation_fee: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DoctorQuery {
    #[serde(flatten)]
    params: ListParams,
    department: Option<String>,
    specialization: Option<String>,
    active: Option<bool>,
}

async fn create_doctor(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateDoctorBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    let doctor = svc.create_doctor(CreateDoctorInput {
        name: body.name,
        email: body.email,
        specialization: body.specialization,
        department: body.department,
        phone: body.phone,
        consultation_fee: body.consultation_fee,
    })?;
    doc_envelope("doctor", &doctor)
}

async fn get_doctor(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    doc_envelope("doctor", &svc.get_doctor(&id)?)
}

async fn list_doctors(
    State(svc): State<AppState>,
    Query(q): Query<DoctorQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let filters = DoctorFilters {
        department: q.department,
        specialization: q.specialization,
        active: q.active,
    };
    list_envelope("doctors", &svc.list_doctors(&q.params, &filters)?)
}

async fn update_doctor(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    doc_envelope("doctor", &svc.update_doctor(&id, patch)?)
}

async fn delete_doctor(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    svc.delete_doctor(&id)?;
    Ok(ok_status())
}
