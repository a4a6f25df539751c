//! Events and participation

pub mod models;
pub mod participation;
pub mod routes;
pub mod service;

pub use models::{Event, EventCategory, EventRequest};
pub use participation::ParticipationManager;
pub use routes::{admin_event_router, event_router};
pub use service::EventService;
