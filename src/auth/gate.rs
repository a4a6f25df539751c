//! Caller resolution and role checks
//!
//! Extracts the bearer token from request headers, verifies it and re-reads
//! the identity it names.

use chrono::{DateTime, Utc};
use http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;

use super::jwt::JwtManager;
use super::models::Role;
use crate::store::UserStore;
use crate::ConnectError;

/// Authenticated caller, passed explicitly into every service call that needs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub identity_id: String,
    pub role: Role,
}

impl CallerContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// The scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Exact role match; roles are not hierarchical
pub fn require_role(context: &CallerContext, required: Role) -> Result<(), ConnectError> {
    if context.role != required {
        log::warn!(
            "Caller {} with role {} denied a {} operation",
            context.identity_id,
            context.role.as_str(),
            required.as_str()
        );
        return Err(ConnectError::Forbidden);
    }
    Ok(())
}

#[derive(Clone)]
pub struct AccessGate {
    jwt: JwtManager,
    users: Arc<dyn UserStore>,
}

impl AccessGate {
    pub fn new(jwt: JwtManager, users: Arc<dyn UserStore>) -> Self {
        Self { jwt, users }
    }

    /// Verify `token` and confirm its subject still exists
    pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<CallerContext, ConnectError> {
        let claims = self.jwt.verify(token, now).map_err(|e| {
            log::debug!("Rejected token: {}", e);
            ConnectError::Unauthorized(e.to_string())
        })?;

        if self.users.find_user_by_id(&claims.sub)?.is_none() {
            log::warn!("Token subject {} no longer exists", claims.sub);
            return Err(ConnectError::IdentityGone);
        }

        Ok(CallerContext {
            identity_id: claims.sub,
            role: claims.role,
        })
    }

    /// Resolve the caller from request headers
    pub fn resolve_headers(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<CallerContext, ConnectError> {
        let token = bearer_token(headers)
            .ok_or_else(|| ConnectError::Unauthorized("missing bearer token".to_string()))?;
        self.resolve(token, now)
    }
}
