//! Event participation
//!
//! A member is in an event's participant set at most once. The uniqueness
//! check and the insert are a single store operation, so concurrent joins for
//! the same pair cannot both succeed.

use chrono::Utc;
use std::sync::Arc;

use super::models::Event;
use crate::auth::CallerContext;
use crate::store::{EventStore, StoreError};
use crate::ConnectError;

#[derive(Clone)]
pub struct ParticipationManager {
    events: Arc<dyn EventStore>,
}

impl ParticipationManager {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Join an event. Joining twice is `AlreadyParticipating`, not a no-op.
    pub fn join(&self, event_id: &str, caller: &CallerContext) -> Result<(), ConnectError> {
        match self
            .events
            .add_participant(event_id, &caller.identity_id, Utc::now())
        {
            Ok(true) => {
                log::info!("Identity {} joined event {}", caller.identity_id, event_id);
                Ok(())
            }
            Ok(false) => Err(ConnectError::EventNotFound),
            Err(StoreError::Duplicate(_)) => Err(ConnectError::AlreadyParticipating),
            Err(e) => Err(e.into()),
        }
    }

    /// Leave an event. Leaving an event never joined is a no-op.
    pub fn leave(&self, event_id: &str, caller: &CallerContext) -> Result<(), ConnectError> {
        if !self.events.event_exists(event_id)? {
            return Err(ConnectError::EventNotFound);
        }

        if self
            .events
            .remove_participant(event_id, &caller.identity_id)?
        {
            log::info!("Identity {} left event {}", caller.identity_id, event_id);
        } else {
            log::debug!(
                "Identity {} was not participating in event {}",
                caller.identity_id,
                event_id
            );
        }
        Ok(())
    }

    pub fn list_for_identity(&self, identity_id: &str) -> Result<Vec<Event>, ConnectError> {
        Ok(self.events.list_events_for_participant(identity_id)?)
    }
}
