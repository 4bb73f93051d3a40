//! Admin-only account management endpoints.

use axum::{
    Router,
    Extension,
    extract::{Path, Query, State},
    routing::{get, post},
    Json,
};
use serde::Deserialize;

use clinic_core::{Claims, ListParams, Role, ServiceError};

use crate::accounts::CreateAccountInput;
use crate::routes::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/accounts", post(create_account).get(list_accounts))
        .route("/auth/accounts/{id}", axum::routing::delete(delete_account))
        .route("/auth/whoami", get(whoami))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountBody {
    username: String,
    password: String,
    role: Role,
    name: String,
    subject_id: Option<String>,
}

async fn create_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateAccountBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(&[])?; // admin only
    let account = state.accounts.create(CreateAccountInput {
        username: body.username,
        password: body.password,
        role: body.role,
        name: body.name,
        subject_id: body.subject_id,
    })?;
    Ok(Json(serde_json::json!({ "account": account.sanitized() })))
}

async fn list_accounts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(&[])?; // admin only
    let result = state.accounts.list(params.limit.min(500), params.offset)?;
    let items: Vec<serde_json::Value> = result.items.iter().map(|a| a.sanitized()).collect();
    Ok(Json(serde_json::json!({
        "accounts": items,
        "total": result.total,
    })))
}

async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    claims.require(&[])?; // admin only
    state.accounts.delete(&id)?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Echo the caller's claims — handy for frontends picking a dashboard.
async fn whoami(
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(Json(serde_json::json!({
        "sub": claims.sub,
        "name": claims.name,
        "role": claims.role,
    })))
}
