use axum::{
    Router,
    Extension,
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use serde::Deserialize;

use clinic_core::{Claims, ListParams, Role, ServiceError};

use crate::model::MedicationLine;
use crate::service::prescription::{CreatePrescriptionInput, PrescriptionFilters};
use super::{AppState, doc_envelope, list_envelope};

/// Only doctors issue prescriptions.
const ISSUE_ROLES: &[Role] = &[Role::Doctor];
/// Roles allowed to read prescriptions.
const READ_ROLES: &[Role] = &[Role::Doctor, Role::Staff, Role::Pharmacist];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/prescriptions", post(create_prescription).get(list_prescriptions))
        .route("/prescriptions/{id}", get(get_prescription))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePrescriptionBody {
    patient_id: String,
    medications: Vec<MedicationLine>,
    notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrescriptionQuery {
    #[serde(flatten)]
    params: ListParams,
    patient_id: Option<String>,
    doctor_id: Option<String>,
}

async fn create_prescription(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreatePrescriptionBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(ISSUE_ROLES)?;
    // The issuing doctor is the caller, not a body field.
    let prescription = svc.create_prescription(CreatePrescriptionInput {
        patient_id: body.patient_id,
        doctor_id: claims.sub.clone(),
        medications: body.medications,
        notes: body.notes,
    })?;
    doc_envelope("prescription", &prescription)
}

async fn get_prescription(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let prescription = svc.get_prescription(&id)?;
    // A patient may read their own prescription.
    if !(claims.role == Role::Patient && claims.sub == prescription.patient_id) {
        claims.require(READ_ROLES)?;
    }
    doc_envelope("prescription", &prescription)
}

async fn list_prescriptions(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<PrescriptionQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let mut filters = PrescriptionFilters {
        patient_id: q.patient_id,
        doctor_id: q.doctor_id,
    };
    if claims.role == Role::Patient {
        filters.patient_id = Some(claims.sub.clone());
    } else {
        claims.require(READ_ROLES)?;
    }
    list_envelope("prescriptions", &svc.list_prescriptions(&q.params, &filters)?)
}
