//! # Event Model
//!
//! Persisted event records, statuses and labels.
//! Events are owned by exactly one user and only ever visible to that user.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{EventError, EventResult};
use super::period::Period;
use super::validate::CandidateEvent;

/// Lifecycle status of an event (closed enumeration)
///
/// Wire codes are the single letters clients already send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    #[serde(rename = "W")]
    Waiting,
    #[serde(rename = "C")]
    Cancelled,
    #[serde(rename = "P")]
    Passed,
}

impl EventStatus {
    /// Single-letter wire code
    pub fn code(&self) -> &'static str {
        match self {
            EventStatus::Waiting => "W",
            EventStatus::Cancelled => "C",
            EventStatus::Passed => "P",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "W" => Some(EventStatus::Waiting),
            "C" => Some(EventStatus::Cancelled),
            "P" => Some(EventStatus::Passed),
            _ => None,
        }
    }
}

/// A free-text label attached to events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Persisted event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub description: Option<String>,
    pub place: Option<String>,

    /// When the event starts (timezone-aware, stored as UTC)
    pub start: DateTime<Utc>,

    /// When the event ends; open-ended events have no end
    pub end: Option<DateTime<Utc>>,

    /// Whether the event recurs
    pub periodic: bool,

    /// Recurrence period, present iff `periodic`
    pub period: Option<Period>,

    /// When to next notify the owner (defaults to 5 minutes before start)
    pub next_notification: Option<DateTime<Utc>>,

    pub status: EventStatus,

    /// Deduplicated label names
    pub labels: BTreeSet<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Materialize a persisted event from a normalized candidate.
    ///
    /// A non-partial validation pass guarantees `start`, `periodic` and
    /// `status` are present; their absence here is an internal-consistency
    /// error, never a validation error.
    pub fn from_candidate(user_id: Uuid, candidate: CandidateEvent) -> EventResult<Self> {
        let start = candidate
            .start
            .ok_or(EventError::IncompleteCandidate("start"))?;
        let periodic = candidate
            .periodic
            .ok_or(EventError::IncompleteCandidate("periodic"))?;
        let status = candidate
            .status
            .ok_or(EventError::IncompleteCandidate("status"))?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            description: candidate.description,
            place: candidate.place,
            start,
            end: candidate.end,
            periodic,
            period: candidate.period,
            next_notification: candidate.next_notification,
            status,
            labels: candidate.labels,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge a validated partial candidate into this event.
    ///
    /// Absent fields keep their stored values; supplied fields replace them.
    /// A partial update cannot clear a field.
    pub fn apply(&mut self, patch: CandidateEvent) {
        if let Some(start) = patch.start {
            self.start = start;
        }
        if patch.end.is_some() {
            self.end = patch.end;
        }
        if let Some(periodic) = patch.periodic {
            self.periodic = periodic;
        }
        if patch.period.is_some() {
            self.period = patch.period;
        }
        if patch.next_notification.is_some() {
            self.next_notification = patch.next_notification;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        if patch.place.is_some() {
            self.place = patch.place;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if !patch.labels.is_empty() {
            self.labels = patch.labels;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(start_hour: u32) -> CandidateEvent {
        CandidateEvent {
            start: Some(Utc.with_ymd_and_hms(2025, 6, 1, start_hour, 0, 0).unwrap()),
            periodic: Some(false),
            status: Some(EventStatus::Waiting),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            EventStatus::Waiting,
            EventStatus::Cancelled,
            EventStatus::Passed,
        ] {
            assert_eq!(EventStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(EventStatus::from_code("X"), None);
    }

    #[test]
    fn test_status_serializes_as_code() {
        let json = serde_json::to_string(&EventStatus::Waiting).unwrap();
        assert_eq!(json, "\"W\"");
    }

    #[test]
    fn test_from_candidate_requires_start() {
        let mut incomplete = candidate(10);
        incomplete.start = None;

        let result = Event::from_candidate(Uuid::new_v4(), incomplete);
        assert!(matches!(
            result,
            Err(EventError::IncompleteCandidate("start"))
        ));
    }

    #[test]
    fn test_from_candidate_materializes_fields() {
        let user_id = Uuid::new_v4();
        let mut full = candidate(10);
        full.description = Some("standup".to_string());
        full.labels = ["work".to_string()].into_iter().collect();

        let event = Event::from_candidate(user_id, full).unwrap();
        assert_eq!(event.user_id, user_id);
        assert_eq!(event.description.as_deref(), Some("standup"));
        assert!(event.labels.contains("work"));
        assert_eq!(event.status, EventStatus::Waiting);
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let event_start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let mut event = Event::from_candidate(Uuid::new_v4(), candidate(10)).unwrap();
        event.place = Some("office".to_string());

        event.apply(CandidateEvent {
            description: Some("moved".to_string()),
            ..Default::default()
        });

        assert_eq!(event.start, event_start);
        assert_eq!(event.place.as_deref(), Some("office"));
        assert_eq!(event.description.as_deref(), Some("moved"));
    }

    #[test]
    fn test_apply_replaces_supplied_fields() {
        let mut event = Event::from_candidate(Uuid::new_v4(), candidate(10)).unwrap();

        let new_start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        event.apply(CandidateEvent {
            start: Some(new_start),
            status: Some(EventStatus::Cancelled),
            labels: ["home".to_string()].into_iter().collect(),
            ..Default::default()
        });

        assert_eq!(event.start, new_start);
        assert_eq!(event.status, EventStatus::Cancelled);
        assert!(event.labels.contains("home"));
    }
}
