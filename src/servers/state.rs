//! Shared application state and the caller extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use std::sync::Arc;

use crate::auth::{AccessGate, AuthService, CallerContext, JwtConfig, JwtManager};
use crate::events::{EventService, ParticipationManager};
use crate::store::{EventStore, SqliteStore, UserStore};
use crate::users::UserService;
use crate::ConnectError;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub gate: AccessGate,
    pub events: EventService,
    pub participation: ParticipationManager,
    pub users: UserService,
}

impl AppState {
    pub fn new(store: SqliteStore, jwt: JwtConfig) -> Result<Self, ConnectError> {
        let store = Arc::new(store);
        let users: Arc<dyn UserStore> = store.clone();
        let events: Arc<dyn EventStore> = store;
        Self::with_stores(users, events, JwtManager::new(jwt))
    }

    pub fn with_stores(
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        jwt: JwtManager,
    ) -> Result<Self, ConnectError> {
        Ok(Self {
            auth: AuthService::new(users.clone(), jwt.clone())?,
            gate: AccessGate::new(jwt, users.clone()),
            events: EventService::new(events.clone()),
            participation: ParticipationManager::new(events),
            users: UserService::new(users),
        })
    }
}

/// Protected handlers take a `CallerContext`; requests without a resolvable
/// bearer token are rejected before the handler runs.
impl FromRequestParts<Arc<AppState>> for CallerContext {
    type Rejection = ConnectError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state.gate.resolve_headers(&parts.headers, Utc::now())
    }
}
