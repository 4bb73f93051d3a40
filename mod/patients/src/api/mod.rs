pub mod appointments;
pub mod patients;
pub mod prescriptions;

use std::sync::Arc;

use axum::{Json, Router};
use serde::Serialize;

use clinic_core::{ListResult, ServiceError};

use crate::service::PatientService;

/// Shared application state.
pub type AppState = Arc<PatientService>;

/// Build the patients API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(patients::routes())
        .merge(appointments::routes())
        .merge(prescriptions::routes())
        .with_state(state)
}

/// Wrap a single document in the `{"<resource>": doc}` envelope.
pub(crate) fn doc_envelope<T: Serialize>(
    name: &'static str,
    value: &T,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let v = serde_json::to_value(value).map_err(|e| ServiceError::Internal(e.to_string()))?;
    let mut map = serde_json::Map::new();
    map.insert(name.to_string(), v);
    Ok(Json(serde_json::Value::Object(map)))
}

/// Wrap a list result in the `{"<resources>": [...], "total": n}` envelope.
pub(crate) fn list_envelope<T: Serialize>(
    name: &'static str,
    result: &ListResult<T>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items =
        serde_json::to_value(&result.items).map_err(|e| ServiceError::Internal(e.to_string()))?;
    let mut map = serde_json::Map::new();
    map.insert(name.to_string(), items);
    map.insert("total".to_string(), serde_json::json!(result.total));
    Ok(Json(serde_json::Value::Object(map)))
}

/// Acknowledgement body for deletes and similar operations.
pub(crate) fn ok_status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
