use axum::{
    Router,
    Extension,
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use serde::Deserialize;

use clinic_core::{Claims, ListParams, Role, ServiceError};

use crate::service::appointment::{AppointmentFilters, CreateAppointmentInput};
use super::{AppState, doc_envelope, list_envelope};

/// Roles allowed to schedule an appointment.
const SCHEDULE_ROLES: &[Role] = &[Role::Staff, Role::Patient];
/// Roles allowed to mark an appointment completed.
const COMPLETE_ROLES: &[Role] = &[Role::Doctor, Role::Staff];
/// Roles allowed to cancel.
const CANCEL_ROLES: &[Role] = &[Role::Staff, Role::Patient, Role::Doctor];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/appointments", post(create_appointment).get(list_appointments))
        .route("/appointments/{id}", get(get_appointment))
        .route("/appointments/{id}/@complete", post(complete_appointment))
        .route("/appointments/{id}/@cancel", post(cancel_appointment))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAppointmentBody {
    patient_id: String,
    doctor_id: String,
    date: String,
    slot: Option<String>,
    reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentQuery {
    #[serde(flatten)]
    params: ListParams,
    patient_id: Option<String>,
    doctor_id: Option<String>,
    status: Option<String>,
    date: Option<String>,
}

async fn create_appointment(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateAppointmentBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(SCHEDULE_ROLES)?;
    // A patient books for themselves, whatever the body says.
    let patient_id = if claims.role == Role::Patient {
        claims.sub.clone()
    } else {
        body.patient_id
    };
    let appointment = svc.create_appointment(CreateAppointmentInput {
        patient_id,
        doctor_id: body.doctor_id,
        date: body.date,
        slot: body.slot,
        reason: body.reason,
    })?;
    doc_envelope("appointment", &appointment)
}

async fn get_appointment(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let appointment = svc.get_appointment(&id)?;
    if claims.role == Role::Patient && claims.sub != appointment.patient_id {
        return Err(ServiceError::PermissionDenied(
            "not your appointment".into(),
        ));
    }
    doc_envelope("appointment", &appointment)
}

async fn list_appointments(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<AppointmentQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let mut filters = AppointmentFilters {
        patient_id: q.patient_id,
        doctor_id: q.doctor_id,
        status: q.status,
        date: q.date,
    };
    // A patient sees only their own appointments, whatever they asked for.
    if claims.role == Role::Patient {
        filters.patient_id = Some(claims.sub.clone());
    }
    list_envelope("appointments", &svc.list_appointments(&q.params, &filters)?)
}

async fn complete_appointment(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(COMPLETE_ROLES)?;
    doc_envelope("appointment", &svc.complete_appointment(&id)?)
}

async fn cancel_appointment(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(CANCEL_ROLES)?;
    // A patient may only cancel their own appointment.
    if claims.role == Role::Patient {
        let appointment = svc.get_appointment(&id)?;
        if claims.sub != appointment.patient_id {
            return Err(ServiceError::PermissionDenied(
                "not your appointment".into(),
            ));
        }
    }
    doc_envelope("appointment", &svc.cancel_appointment(&id)?)
}
