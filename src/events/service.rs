//! Event listing and admin management

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::models::{Event, EventCategory, EventRequest};
use crate::auth::{require_role, CallerContext, Role};
use crate::store::EventStore;
use crate::ConnectError;

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    pub fn list_events(&self) -> Result<Vec<Event>, ConnectError> {
        Ok(self.events.list_events()?)
    }

    pub fn get_event(&self, id: &str) -> Result<Event, ConnectError> {
        self.events
            .find_event(id)?
            .ok_or(ConnectError::EventNotFound)
    }

    /// Admin only. The caller becomes the event owner.
    pub fn create_event(
        &self,
        caller: &CallerContext,
        req: EventRequest,
        now: DateTime<Utc>,
    ) -> Result<Event, ConnectError> {
        require_role(caller, Role::Admin)?;

        let category = EventCategory::parse(&req.category).ok_or_else(|| {
            ConnectError::Validation(format!("Unknown event category: {}", req.category))
        })?;

        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            title: non_blank("title", req.title)?,
            description: non_blank("description", req.description)?,
            starts_at: req.starts_at,
            location: non_blank("location", req.location)?,
            category,
            created_by: caller.identity_id.clone(),
            created_at: now,
            participants: Vec::new(),
        };

        self.events.insert_event(&event)?;
        log::info!("Event {} created by {}", event.id, caller.identity_id);
        Ok(event)
    }

    /// Admin only. Memberships go with the event.
    pub fn delete_event(&self, caller: &CallerContext, id: &str) -> Result<(), ConnectError> {
        require_role(caller, Role::Admin)?;

        if !self.events.delete_event(id)? {
            return Err(ConnectError::EventNotFound);
        }
        log::info!("Event {} deleted by {}", id, caller.identity_id);
        Ok(())
    }
}

fn non_blank(field: &str, value: String) -> Result<String, ConnectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConnectError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{Identity, Profile};
    use crate::store::{SqliteStore, UserStore};
    use assert_matches::assert_matches;

    fn admin() -> CallerContext {
        CallerContext {
            identity_id: "admin".to_string(),
            role: Role::Admin,
        }
    }

    fn member() -> CallerContext {
        CallerContext {
            identity_id: "member".to_string(),
            role: Role::Member,
        }
    }

    fn service() -> EventService {
        let store = SqliteStore::in_memory().unwrap();
        let now = Utc::now();
        for (id, role) in [("admin", Role::Admin), ("member", Role::Member)] {
            store
                .insert_user(&Identity {
                    id: id.to_string(),
                    email: format!("{}@example.com", id),
                    password_hash: "hash".to_string(),
                    role,
                    profile: Profile::default(),
                    created_at: now,
                    updated_at: now,
                })
                .unwrap();
        }
        EventService::new(Arc::new(store))
    }

    fn request(category: &str) -> EventRequest {
        EventRequest {
            title: "  Career forum ".to_string(),
            description: "Talks and networking".to_string(),
            starts_at: Utc::now(),
            location: "Library".to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_admin_creates_and_deletes() {
        let events = service();
        let created = events.create_event(&admin(), request("Forum"), Utc::now()).unwrap();

        assert_eq!(created.title, "Career forum");
        assert_eq!(created.category, EventCategory::Forum);
        assert_eq!(created.created_by, "admin");
        assert_eq!(events.get_event(&created.id).unwrap().id, created.id);
        assert_eq!(events.list_events().unwrap().len(), 1);

        events.delete_event(&admin(), &created.id).unwrap();
        assert_matches!(events.get_event(&created.id), Err(ConnectError::EventNotFound));
        assert_matches!(
            events.delete_event(&admin(), &created.id),
            Err(ConnectError::EventNotFound)
        );
    }

    #[test]
    fn test_member_is_forbidden() {
        let events = service();
        assert_matches!(
            events.create_event(&member(), request("forum"), Utc::now()),
            Err(ConnectError::Forbidden)
        );

        let created = events.create_event(&admin(), request("other"), Utc::now()).unwrap();
        assert_matches!(
            events.delete_event(&member(), &created.id),
            Err(ConnectError::Forbidden)
        );
        assert!(events.get_event(&created.id).is_ok());
    }

    #[test]
    fn test_create_validation() {
        let events = service();
        assert_matches!(
            events.create_event(&admin(), request("party"), Utc::now()),
            Err(ConnectError::Validation(_))
        );

        let mut blank = request("meetup");
        blank.location = " ".to_string();
        assert_matches!(
            events.create_event(&admin(), blank, Utc::now()),
            Err(ConnectError::Validation(_))
        );
    }
}
