use std::sync::Arc;

use axum::{
    Router,
    Extension,
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use serde::{Deserialize, Serialize};

use clinic_core::{Claims, ListParams, ListResult, Role, ServiceError};

use crate::model::ItemCategory;
use crate::service::{CreateItemInput, PharmacyService};

/// Shared application state.
pub type AppState = Arc<PharmacyService>;

/// Roles allowed to modify inventory.
const WRITE_ROLES: &[Role] = &[Role::Pharmacist];
/// Roles allowed to read inventory.
const READ_ROLES: &[Role] = &[Role::Pharmacist, Role::Doctor, Role::Staff];

/// Build the pharmacy API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateItemBody {
    name: String,
    category: ItemCategory,
    #[serde(default)]
    quantity: i64,
    unit: Option<String>,
    unit_price: Option<f64>,
    supplier: Option<String>,
    expiry_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemQuery {
    #[serde(flatten)]
    params: ListParams,
    category: Option<String>,
}

fn envelope<T: Serialize>(
    name: &'static str,
    value: &T,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let v = serde_json::to_value(value).map_err(|e| ServiceError::Internal(e.to_string()))?;
    let mut map = serde_json::Map::new();
    map.insert(name.to_string(), v);
    Ok(Json(serde_json::Value::Object(map)))
}

fn list_envelope<T: Serialize>(
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

async fn create_item(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateItemBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    let item = svc.create_item(CreateItemInput {
        name: body.name,
        category: body.category,
        quantity: body.quantity,
        unit: body.unit,
        unit_price: body.unit_price,
        supplier: body.supplier,
        expiry_date: body.expiry_date,
    })?;
    envelope("item", &item)
}

async fn get_item(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(READ_ROLES)?;
    envelope("item", &svc.get_item(&id)?)
}

async fn list_items(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<ItemQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(READ_ROLES)?;
    list_envelope("items", &svc.list_items(&q.params, q.category.as_deref())?)
}

async fn update_item(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    envelope("item", &svc.update_item(&id, patch)?)
}

async fn delete_item(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    svc.delete_item(&id)?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
