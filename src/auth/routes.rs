//! Authentication REST API routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use super::models::{AuthResponse, LoginRequest, RegisterRequest, Role};
use crate::servers::{http::json_body, AppState};
use crate::ConnectError;

/// Create auth router
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// POST /api/auth/register - Register new member
async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ConnectError> {
    let req = json_body(payload)?;
    let auth = state.auth.clone();

    // password hashing blocks, run it on the blocking pool
    let (user, token) =
        tokio::task::spawn_blocking(move || auth.register(req, Role::Member, Utc::now()))
            .await
            .map_err(|e| ConnectError::Internal(format!("registration task failed: {}", e)))??;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /api/auth/login - Login with email/password
async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ConnectError> {
    let req = json_body(payload)?;
    let auth = state.auth.clone();

    let (user, token) =
        tokio::task::spawn_blocking(move || auth.login(&req.email, &req.password, Utc::now()))
            .await
            .map_err(|e| ConnectError::Internal(format!("login task failed: {}", e)))??;

    Ok(Json(AuthResponse { token, user }))
}
