//! # Community Connect
//!
//! Backend for a community of members and the events they join.
//!
//! ## Features
//!
//! - **Authentication**: registration, login, stateless JWT sessions, role-gated access
//! - **Events**: public listing, admin-managed creation and deletion
//! - **Participation**: at-most-once membership per (event, member), idempotent leave
//! - **Profiles**: self-service profile updates, admin user directory
//!
//! ## Usage
//!
//! ```rust,no_run
//! use community_connect::{
//!     auth::JwtConfig,
//!     servers::{ApiConfig, ApiServer, AppState},
//!     store::SqliteStore,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("data/connect.db")?;
//! let state = AppState::new(store, JwtConfig::from_env())?;
//! ApiServer::new(ApiConfig::default(), state).start().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Tokens, credentials, registration/login and access control
pub mod auth;

/// Events and participation
pub mod events;

/// Member profiles and the admin user directory
pub mod users;

/// Persistence traits and the SQLite implementation
pub mod store;

/// HTTP server
pub mod servers;

/// Logger setup
pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use auth::{AccessGate, AuthService, CallerContext, Identity, Role};
pub use events::{Event, EventService, ParticipationManager};
pub use store::{EventStore, SqliteStore, StoreError, UserStore};
pub use users::UserService;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Service-level error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Not found")]
    NotFound,

    #[error("Event not found")]
    EventNotFound,

    /// Unknown email and wrong password both end up here
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Already participating in this event")]
    AlreadyParticipating,

    #[error("Forbidden")]
    Forbidden,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The token is valid but its identity no longer exists
    #[error("Identity no longer exists")]
    IdentityGone,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ConnectError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
