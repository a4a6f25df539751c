//! Member profiles

pub mod routes;
pub mod service;

pub use routes::{admin_user_router, user_router};
pub use service::UserService;
