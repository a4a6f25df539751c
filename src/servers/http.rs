use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use super::state::AppState;
use crate::auth::auth_router;
use crate::events::{admin_event_router, event_router};
use crate::users::{admin_user_router, user_router};
use crate::ConnectError;

#[derive(Serialize, Debug, Clone)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

// Configuration pour le serveur HTTP
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8082,
            host: "0.0.0.0".to_string(),
        }
    }
}

pub struct ApiServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.create_router();
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;

        log::info!("🌐 API server listening on http://{}", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }

    pub fn create_router(&self) -> Router {
        create_router(self.state.clone())
    }
}

/// Full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(api_status))
        .merge(auth_router())
        .merge(event_router())
        .merge(user_router())
        .merge(admin_event_router())
        .merge(admin_user_router())
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn api_status() -> ResponseJson<ApiResponse> {
    ResponseJson(ApiResponse {
        status: "ready".to_string(),
        message: "Community Connect server is running".to_string(),
    })
}

/// Turn a JSON body rejection into a validation error
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ConnectError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ConnectError::Validation(rejection.body_text()))
}

impl ConnectError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConnectError::Validation(_) => StatusCode::BAD_REQUEST,
            ConnectError::DuplicateEmail | ConnectError::AlreadyParticipating => {
                StatusCode::CONFLICT
            }
            ConnectError::NotFound | ConnectError::EventNotFound => StatusCode::NOT_FOUND,
            ConnectError::InvalidCredentials
            | ConnectError::Unauthorized(_)
            | ConnectError::IdentityGone => StatusCode::UNAUTHORIZED,
            ConnectError::Forbidden => StatusCode::FORBIDDEN,
            ConnectError::Store(_) | ConnectError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConnectError::Validation(_) => "validation_error",
            ConnectError::DuplicateEmail => "duplicate_email",
            ConnectError::NotFound => "not_found",
            ConnectError::EventNotFound => "event_not_found",
            ConnectError::InvalidCredentials => "invalid_credentials",
            ConnectError::AlreadyParticipating => "already_participating",
            ConnectError::Forbidden => "forbidden",
            ConnectError::Unauthorized(_) => "unauthorized",
            ConnectError::IdentityGone => "identity_gone",
            ConnectError::Store(_) | ConnectError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ConnectError {
    fn into_response(self) -> Response {
        let message = match &self {
            ConnectError::Store(e) => {
                log::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            ConnectError::Internal(e) => {
                log::error!("Internal error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            self.status_code(),
            Json(ErrorResponse {
                error: message,
                code: self.code(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8082);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[tokio::test]
    async fn test_api_status_endpoint() {
        let response = api_status().await;
        assert_eq!(response.0.status, "ready");
        assert_eq!(response.0.message, "Community Connect server is running");
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            ConnectError::AlreadyParticipating.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ConnectError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ConnectError::IdentityGone.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ConnectError::IdentityGone.code(), "identity_gone");
        assert_eq!(
            ConnectError::Store(StoreError::Poisoned).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_errors_are_opaque() {
        let response = ConnectError::Store(StoreError::Duplicate("users.email".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
