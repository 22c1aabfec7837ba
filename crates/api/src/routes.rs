use std::path::Path;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use hh_auth::{hash_password_async, verify_password_async, AuthError};
use hh_core::{config::AppConfig, error::{ApiError, ApiResult}};
use hh_policy::Transport;
use serde::{Deserialize, Serialize};
use tower_http::services::{ServeDir, ServeFile};

use crate::{state::AppState, validation};

/// Middleware names in request order, reported by `/_api/app-info`.
pub const APP_STACK: &[&str] = &[
    "headerPolicy",
    "setRequestId",
    "trace",
    "requestBodyLimit",
    "concurrencyLimit",
    "poweredBy",
];

pub fn routes(cfg: &AppConfig) -> Router<AppState> {
    let index = Path::new(&cfg.app.views_dir).join("index.html");

    Router::new()
        .route_service("/", ServeFile::new(index))
        .route("/health", get(health))
        .nest("/_api", api_routes())
        .fallback_service(ServeDir::new(&cfg.app.public_dir))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/app-info", get(app_info))
        .route("/hash", post(hash))
        .route("/verify", post(verify))
}

async fn health() -> impl IntoResponse { (StatusCode::OK, "ok") }

#[derive(Serialize)]
struct HeaderEntry {
    name: String,
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppInfo {
    secure: bool,
    headers: Vec<HeaderEntry>,
    app_stack: &'static [&'static str],
}

async fn app_info(State(state): State<AppState>, Extension(transport): Extension<Transport>) -> Json<AppInfo> {
    let headers = state
        .policy
        .resolved(transport)
        .pairs()
        .map(|(name, value)| HeaderEntry {
            name: name.as_str().to_owned(),
            value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        })
        .collect();
    Json(AppInfo { secure: transport == Transport::Secure, headers, app_stack: APP_STACK })
}

#[derive(Deserialize)]
struct HashIn {
    password: String,
}
#[derive(Serialize)]
struct HashOut {
    hash: String,
}

async fn hash(Json(input): Json<HashIn>) -> ApiResult<Json<HashOut>> {
    validation::validate_password(&input.password)?;
    let hash = hash_password_async(input.password).await.map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ApiError::Internal
    })?;
    Ok(Json(HashOut { hash }))
}

#[derive(Deserialize)]
struct VerifyIn {
    password: String,
    hash: String,
}
#[derive(Serialize)]
struct VerifyOut {
    valid: bool,
}

async fn verify(Json(input): Json<VerifyIn>) -> ApiResult<Json<VerifyOut>> {
    validation::validate_hash(&input.hash)?;
    let valid = verify_password_async(input.password, input.hash).await.map_err(|e| match e {
        AuthError::Malformed => ApiError::BadRequest("malformed password hash".into()),
        other => {
            tracing::error!(error = %other, "password verification failed");
            ApiError::Internal
        }
    })?;
    tracing::debug!(valid, "password verified");
    Ok(Json(VerifyOut { valid }))
}
