//! Login endpoint — verifies the password against the stored argon2id
//! hash and issues a JWT.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use clinic_core::Claims;

use crate::accounts::verify_password;
use crate::routes::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub role: String,
}

/// Register login routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login_handler))
}

/// Handle POST /auth/login.
async fn login_handler(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<LoginRequest>,
) -> axum::response::Response {
    let account = match state.accounts.find_by_username(&body.username) {
        Ok(Some(account)) => account,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            tracing::error!("account lookup failed: {}", e);
            return e.into_response();
        }
    };

    if !verify_password(&body.password, &account.password_hash) {
        return invalid_credentials();
    }

    let now = chrono::Utc::now().timestamp();
    let expire_secs = state.server_config.jwt.expire_secs;

    let claims = Claims {
        sub: account.subject().to_string(),
        name: account.name.clone(),
        role: account.role,
        sid: clinic_core::new_id(),
        iat: now,
        exp: now + expire_secs as i64,
    };

    let encoding_key = EncodingKey::from_secret(state.server_config.jwt.secret.as_bytes());
    match encode(&Header::default(), &claims, &encoding_key) {
        Ok(token) => {
            let response = LoginResponse {
                access_token: token,
                token_type: "Bearer".to_string(),
                expires_in: expire_secs,
                role: account.role.as_str().to_string(),
            };
            (StatusCode::OK, axum::Json(serde_json::json!(response))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode JWT: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({
                    "code": "INTERNAL",
                    "message": "internal server error",
                })),
            )
                .into_response()
        }
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(serde_json::json!({
            "code": "UNAUTHENTICATED",
            "message": "invalid credentials",
        })),
    )
        .into_response()
}
