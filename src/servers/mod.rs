// Modules for server components
pub mod http;
pub mod state;

// Re-export public APIs
pub use http::{create_router, ApiConfig, ApiServer};
pub use state::AppState;
