//! Event REST API routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use super::models::{Event, EventRequest};
use crate::auth::{CallerContext, MessageResponse};
use crate::servers::{http::json_body, AppState};
use crate::ConnectError;

/// Public listing plus member participation
pub fn event_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events/{id}", get(get_event))
        .route(
            "/api/events/{id}/participate",
            post(join_event).delete(leave_event),
        )
        .route("/api/events/user/{user_id}", get(list_user_events))
}

/// Admin-only event management
pub fn admin_event_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/events", post(create_event))
        .route("/api/admin/events/{id}", delete(delete_event))
}

/// GET /api/events
async fn list_events(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Event>>, ConnectError> {
    Ok(Json(state.events.list_events()?))
}

/// GET /api/events/{id}
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ConnectError> {
    Ok(Json(state.events.get_event(&id)?))
}

/// POST /api/events/{id}/participate
async fn join_event(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ConnectError> {
    state.participation.join(&id, &caller)?;
    Ok(Json(MessageResponse {
        message: "Joined event".to_string(),
    }))
}

/// DELETE /api/events/{id}/participate
async fn leave_event(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ConnectError> {
    state.participation.leave(&id, &caller)?;
    Ok(Json(MessageResponse {
        message: "Left event".to_string(),
    }))
}

/// GET /api/events/user/{user_id}
async fn list_user_events(
    State(state): State<Arc<AppState>>,
    _caller: CallerContext,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Event>>, ConnectError> {
    Ok(Json(state.participation.list_for_identity(&user_id)?))
}

/// POST /api/admin/events
async fn create_event(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ConnectError> {
    let req = json_body(payload)?;
    let event = state.events.create_event(&caller, req, Utc::now())?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// DELETE /api/admin/events/{id}
async fn delete_event(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ConnectError> {
    state.events.delete_event(&caller, &id)?;
    Ok(Json(MessageResponse {
        message: "Event deleted".to_string(),
    }))
}
