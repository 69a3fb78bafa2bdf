//! # Event Storage
//!
//! Repository abstraction over event persistence.
//! All queries are scoped to one owning user.

use std::sync::RwLock;

use uuid::Uuid;

use super::errors::{EventError, EventResult};
use super::model::Event;
use super::validate::EventInterval;

/// Event repository trait
///
/// Abstracts storage operations for events.
pub trait EventRepository: Send + Sync {
    /// Find an event by its ID
    fn find_by_id(&self, id: Uuid) -> EventResult<Option<Event>>;

    /// All events belonging to a user, ordered by start
    fn list_for_user(&self, user_id: Uuid) -> EventResult<Vec<Event>>;

    /// The `(start, end)` pairs of a user's events with a non-null end,
    /// optionally excluding one event (self-exclusion on update)
    fn overlap_intervals(
        &self,
        user_id: Uuid,
        exclude: Option<Uuid>,
    ) -> EventResult<Vec<EventInterval>>;

    /// Persist a new event
    fn create(&self, event: &Event) -> EventResult<()>;

    /// Replace an existing event
    fn update(&self, event: &Event) -> EventResult<()>;

    /// Delete an event
    fn delete(&self, id: Uuid) -> EventResult<()>;
}

/// In-memory event repository
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: RwLock<Vec<Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventRepository for InMemoryEventRepository {
    fn find_by_id(&self, id: Uuid) -> EventResult<Option<Event>> {
        let events = self
            .events
            .read()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;
        Ok(events.iter().find(|e| e.id == id).cloned())
    }

    fn list_for_user(&self, user_id: Uuid) -> EventResult<Vec<Event>> {
        let events = self
            .events
            .read()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;
        let mut owned: Vec<Event> = events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|e| e.start);
        Ok(owned)
    }

    fn overlap_intervals(
        &self,
        user_id: Uuid,
        exclude: Option<Uuid>,
    ) -> EventResult<Vec<EventInterval>> {
        let events = self
            .events
            .read()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;
        Ok(events
            .iter()
            .filter(|e| e.user_id == user_id && Some(e.id) != exclude)
            .filter_map(|e| e.end.map(|end| EventInterval::new(e.start, end)))
            .collect())
    }

    fn create(&self, event: &Event) -> EventResult<()> {
        let mut events = self
            .events
            .write()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;
        events.push(event.clone());
        Ok(())
    }

    fn update(&self, event: &Event) -> EventResult<()> {
        let mut events = self
            .events
            .write()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;

        if let Some(existing) = events.iter_mut().find(|e| e.id == event.id) {
            *existing = event.clone();
            Ok(())
        } else {
            Err(EventError::NotFound)
        }
    }

    fn delete(&self, id: Uuid) -> EventResult<()> {
        let mut events = self
            .events
            .write()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;

        let len_before = events.len();
        events.retain(|e| e.id != id);

        if events.len() == len_before {
            Err(EventError::NotFound)
        } else {
            Ok(())
        }
    }
}
