//! Event data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Forum,
    Meetup,
    Other,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Forum => "forum",
            EventCategory::Meetup => "meetup",
            EventCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "forum" => Some(EventCategory::Forum),
            "meetup" => Some(EventCategory::Meetup),
            "other" => Some(EventCategory::Other),
            _ => None,
        }
    }
}

/// Event snapshot. Participants are identity ids in join order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub category: EventCategory,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<String>,
}

impl Event {
    pub fn has_participant(&self, identity_id: &str) -> bool {
        self.participants.iter().any(|p| p == identity_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub category: String,
}
