use axum::{
    Router,
    Extension,
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use serde::Deserialize;

use clinic_core::{Claims, ListParams, Role, ServiceError};

use crate::service::patient::CreatePatientInput;
use super::{AppState, doc_envelope, list_envelope, ok_status};

/// Roles allowed to manage patient records.
const WRITE_ROLES: &[Role] = &[Role::Staff, Role::Doctor];
const READ_ROLES: &[Role] = &[Role::Staff, Role::Doctor];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/patients", post(create_patient).get(list_patients))
        .route(
            "/patients/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePatientBody {
    name: String,
    date_of_birth: Option<String>,
    gender: Option<String>,
    blood_group: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    #[serde(default)]
    medical_history: Vec<String>,
}

async fn create_patient(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreatePatientBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    let patient = svc.create_patient(CreatePatientInput {
        name: body.name,
        date_of_birth: body.date_of_birth,
        gender: body.gender,
        blood_group: body.blood_group,
        phone: body.phone,
        address: body.address,
        medical_history: body.medical_history,
    })?;
    doc_envelope("patient", &patient)
}

async fn get_patient(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    // A patient may read their own record; everyone else needs a staff role.
    if !(claims.role == Role::Patient && claims.sub == id) {
        claims.require(READ_ROLES)?;
    }
    doc_envelope("patient", &svc.get_patient(&id)?)
}

async fn list_patients(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(READ_ROLES)?;
    list_envelope("patients", &svc.list_patients(&params)?)
}

async fn update_patient(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    doc_envelope("patient", &svc.update_patient(&id, patch)?)
}

async fn delete_patient(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    svc.delete_patient(&id)?;
    Ok(ok_status())
}
