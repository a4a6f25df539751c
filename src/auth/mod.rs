//! Authentication module
//!
//! Provides:
//! - Password hashing and strength checks (Argon2id)
//! - JWT issuance and verification
//! - Registration and login
//! - Per-request caller resolution and role checks

pub mod gate;
pub mod jwt;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;

pub use gate::{bearer_token, require_role, AccessGate, CallerContext};
pub use jwt::{JwtConfig, JwtManager, TokenError};
pub use models::*;
pub use routes::auth_router;
pub use service::AuthService;
