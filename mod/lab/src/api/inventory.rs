use axum::{
    Router,
    Extension,
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use serde::Deserialize;

use clinic_core::{Claims, ListParams, Role, ServiceError};

use crate::model::StockOp;
use crate::service::inventory::{AdjustStockInput, CreateLabItemInput, LabItemFilters};
use super::{AppState, doc_envelope, list_envelope, ok_status};

/// Roles allowed to manage lab stock.
const WRITE_ROLES: &[Role] = &[Role::LabTechnician];
/// Roles allowed to read lab stock.
const READ_ROLES: &[Role] = &[Role::LabTechnician, Role::Pharmacist, Role::Doctor, Role::Staff];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items/{id}/@adjust", post(adjust_stock))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateLabItemBody {
    name: String,
    category: Option<String>,
    #[serde(default)]
    current_stock: i64,
    min_required: i64,
    unit: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabItemQuery {
    #[serde(flatten)]
    params: ListParams,
    status: Option<String>,
    category: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdjustStockBody {
    op: StockOp,
    quantity: i64,
    note: Option<String>,
}

async fn create_item(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateLabItemBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    let item = svc.create_item(CreateLabItemInput {
        name: body.name,
        category: body.category,
        current_stock: body.current_stock,
        min_required: body.min_required,
        unit: body.unit,
    })?;
    doc_envelope("labItem", &item)
}

async fn get_item(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(READ_ROLES)?;
    doc_envelope("labItem", &svc.get_item(&id)?)
}

async fn list_items(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<LabItemQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(READ_ROLES)?;
    let filters = LabItemFilters {
        status: q.status,
        category: q.category,
    };
    list_envelope("labItems", &svc.list_items(&q.params, &filters)?)
}

async fn update_item(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    doc_envelope("labItem", &svc.update_item(&id, patch)?)
}

async fn delete_item(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    svc.delete_item(&id)?;
    Ok(ok_status())
}

async fn adjust_stock(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<AdjustStockBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(WRITE_ROLES)?;
    let item = svc.adjust_stock(
        &id,
        AdjustStockInput {
            op: body.op,
            quantity: body.quantity,
            by: claims.sub.clone(),
            note: body.note,
        },
    )?;
    doc_envelope("labItem", &item)
}
