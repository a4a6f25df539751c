//! Profile and user directory REST API routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use crate::auth::{require_role, CallerContext, Identity, Role, UpdateProfileRequest};
use crate::servers::{http::json_body, AppState};
use crate::ConnectError;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/me", get(get_profile).put(update_profile))
        .route("/api/users/all-users", get(list_directory))
        .route("/api/users/{id}", get(get_user))
}

pub fn admin_user_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}", get(admin_get_user))
}

/// GET /api/users/me
async fn get_profile(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
) -> Result<Json<Identity>, ConnectError> {
    Ok(Json(state.users.get_profile(&caller)?))
}

/// PUT /api/users/me
async fn update_profile(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<Identity>, ConnectError> {
    let req = json_body(payload)?;
    Ok(Json(state.users.update_profile(&caller, req, Utc::now())?))
}

/// GET /api/users/all-users
async fn list_directory(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
) -> Result<Json<Vec<Identity>>, ConnectError> {
    Ok(Json(state.users.list_directory(&caller)?))
}

/// GET /api/users/{id} - admin or self
async fn get_user(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    Path(id): Path<String>,
) -> Result<Json<Identity>, ConnectError> {
    Ok(Json(state.users.get_user(&caller, &id)?))
}

/// GET /api/admin/users
async fn list_users(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
) -> Result<Json<Vec<Identity>>, ConnectError> {
    Ok(Json(state.users.list_users(&caller)?))
}

/// GET /api/admin/users/{id}
async fn admin_get_user(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    Path(id): Path<String>,
) -> Result<Json<Identity>, ConnectError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.users.get_user(&caller, &id)?))
}
