//! # Event Service
//!
//! Orchestrates validation and persistence for one user's events.
//!
//! ## Invariants
//! - EVS1: events are only visible to their owning user
//! - EVS2: validate-and-commit is serialized per user, so two concurrent
//!   requests cannot both pass the overlap check against a snapshot missing
//!   each other's event

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use super::errors::{EventError, EventResult};
use super::labels::LabelRepository;
use super::model::Event;
use super::store::EventRepository;
use super::validate::{validate, CandidateEvent};

/// Event service combining validator, event storage and label storage
pub struct EventService<E: EventRepository, L: LabelRepository> {
    events: Arc<E>,
    labels: Arc<L>,
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<E: EventRepository, L: LabelRepository> EventService<E, L> {
    pub fn new(events: E, labels: L) -> Self {
        Self {
            events: Arc::new(events),
            labels: Arc::new(labels),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The commit lock for one user (invariant EVS2)
    fn user_lock(&self, user_id: Uuid) -> EventResult<Arc<Mutex<()>>> {
        let mut locks = self
            .user_locks
            .lock()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;
        Ok(locks.entry(user_id).or_default().clone())
    }

    /// Validate and persist a new event for a user
    pub fn create(&self, user_id: Uuid, candidate: CandidateEvent) -> EventResult<Event> {
        let lock = self.user_lock(user_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;

        let intervals = self.events.overlap_intervals(user_id, None)?;
        let normalized = validate(&candidate, &intervals, false)?;

        self.labels.get_or_create_all(&normalized.labels)?;

        let event = Event::from_candidate(user_id, normalized)?;
        self.events.create(&event)?;

        debug!(event_id = %event.id, user_id = %user_id, "event created");
        Ok(event)
    }

    /// Fetch one event, enforcing ownership
    pub fn get(&self, user_id: Uuid, event_id: Uuid) -> EventResult<Event> {
        self.events
            .find_by_id(event_id)?
            .filter(|e| e.user_id == user_id)
            .ok_or(EventError::NotFound)
    }

    /// All events of a user, ordered by start
    pub fn list(&self, user_id: Uuid) -> EventResult<Vec<Event>> {
        self.events.list_for_user(user_id)
    }

    /// Apply a partial update to an event.
    ///
    /// Only supplied fields are validated and replaced; the event under
    /// update is excluded from its own overlap check.
    pub fn update(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        patch: CandidateEvent,
    ) -> EventResult<Event> {
        let lock = self.user_lock(user_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;

        let mut event = self
            .events
            .find_by_id(event_id)?
            .filter(|e| e.user_id == user_id)
            .ok_or(EventError::NotFound)?;

        let intervals = self.events.overlap_intervals(user_id, Some(event_id))?;
        let normalized = validate(&patch, &intervals, true)?;

        self.labels.get_or_create_all(&normalized.labels)?;

        event.apply(normalized);
        self.events.update(&event)?;

        debug!(event_id = %event.id, user_id = %user_id, "event updated");
        Ok(event)
    }

    /// Delete an event, enforcing ownership
    pub fn delete(&self, user_id: Uuid, event_id: Uuid) -> EventResult<()> {
        let lock = self.user_lock(user_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;

        self.events
            .find_by_id(event_id)?
            .filter(|e| e.user_id == user_id)
            .ok_or(EventError::NotFound)?;

        self.events.delete(event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::labels::InMemoryLabelRepository;
    use crate::events::model::EventStatus;
    use crate::events::store::InMemoryEventRepository;
    use crate::events::validate::SCHEMA_KEY;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0).unwrap()
    }

    fn create_service() -> EventService<InMemoryEventRepository, InMemoryLabelRepository> {
        EventService::new(
            InMemoryEventRepository::new(),
            InMemoryLabelRepository::new(),
        )
    }

    fn candidate(start: DateTime<Utc>, end: DateTime<Utc>) -> CandidateEvent {
        CandidateEvent {
            start: Some(start),
            end: Some(end),
            periodic: Some(false),
            status: Some(EventStatus::Waiting),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_get() {
        let service = create_service();
        let user = Uuid::new_v4();

        let event = service.create(user, candidate(at(10, 0), at(11, 0))).unwrap();
        let fetched = service.get(user, event.id).unwrap();

        assert_eq!(fetched, event);
        // The notification default was applied before persisting.
        assert_eq!(fetched.next_notification, Some(at(9, 55)));
    }

    #[test]
    fn test_get_scoped_to_owner() {
        let service = create_service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let event = service.create(owner, candidate(at(10, 0), at(11, 0))).unwrap();

        assert!(matches!(
            service.get(stranger, event.id),
            Err(EventError::NotFound)
        ));
    }

    #[test]
    fn test_create_rejects_overlap_with_stored_event() {
        let service = create_service();
        let user = Uuid::new_v4();

        service.create(user, candidate(at(10, 0), at(12, 0))).unwrap();
        let result = service.create(user, candidate(at(11, 0), at(13, 0)));

        match result {
            Err(EventError::Validation(errors)) => {
                assert!(errors.field(SCHEMA_KEY).is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_allows_overlap_across_users() {
        let service = create_service();

        service
            .create(Uuid::new_v4(), candidate(at(10, 0), at(12, 0)))
            .unwrap();
        service
            .create(Uuid::new_v4(), candidate(at(10, 0), at(12, 0)))
            .unwrap();
    }

    #[test]
    fn test_update_excludes_self_from_overlap() {
        let service = create_service();
        let user = Uuid::new_v4();

        let event = service.create(user, candidate(at(10, 0), at(12, 0))).unwrap();

        // Shifting the same event within its own old slot must not trip the
        // overlap check against itself.
        let updated = service
            .update(
                user,
                event.id,
                CandidateEvent {
                    start: Some(at(10, 30)),
                    end: Some(at(12, 0)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.start, at(10, 30));
    }

    #[test]
    fn test_update_detects_overlap_with_other_events() {
        let service = create_service();
        let user = Uuid::new_v4();

        service.create(user, candidate(at(8, 0), at(9, 0))).unwrap();
        let event = service.create(user, candidate(at(10, 0), at(11, 0))).unwrap();

        let result = service.update(
            user,
            event.id,
            CandidateEvent {
                start: Some(at(8, 30)),
                end: Some(at(9, 30)),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(EventError::Validation(_))));
    }

    #[test]
    fn test_partial_update_of_place_only() {
        let service = create_service();
        let user = Uuid::new_v4();

        let event = service.create(user, candidate(at(10, 0), at(11, 0))).unwrap();
        let updated = service
            .update(
                user,
                event.id,
                CandidateEvent {
                    place: Some("office".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.place.as_deref(), Some("office"));
        assert_eq!(updated.start, event.start);
        assert_eq!(updated.end, event.end);
    }

    #[test]
    fn test_labels_created_on_successful_validation() {
        let service = create_service();
        let user = Uuid::new_v4();

        let mut with_labels = candidate(at(10, 0), at(11, 0));
        with_labels.labels = ["work".to_string(), "urgent".to_string()]
            .into_iter()
            .collect();

        let event = service.create(user, with_labels).unwrap();
        assert_eq!(event.labels.len(), 2);
    }

    #[test]
    fn test_delete_enforces_ownership() {
        let service = create_service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let event = service.create(owner, candidate(at(10, 0), at(11, 0))).unwrap();

        assert!(matches!(
            service.delete(stranger, event.id),
            Err(EventError::NotFound)
        ));
        service.delete(owner, event.id).unwrap();
        assert!(matches!(
            service.get(owner, event.id),
            Err(EventError::NotFound)
        ));
    }

    #[test]
    fn test_failed_validation_persists_nothing() {
        let service = create_service();
        let user = Uuid::new_v4();

        let result = service.create(user, candidate(at(12, 0), at(10, 0)));
        assert!(matches!(result, Err(EventError::Validation(_))));
        assert!(service.list(user).unwrap().is_empty());
    }
}
