//! # Event Validation
//!
//! Temporal validation and overlap detection for candidate events.
//!
//! The validator is a pure function over a candidate's temporal fields and
//! a read-only snapshot of the user's stored intervals. Every violated rule
//! is accumulated into a field-keyed [`ValidationErrors`] map rather than
//! stopping at the first failure, so a client sees all offending inputs in
//! one response.
//!
//! ## Invariants
//! - EV1: accepted output satisfies `start <= end` when `end` is present
//! - EV2: `periodic` and `period` are both present or both absent
//! - EV3: `period` is strictly smaller than the event's own span
//! - EV4: `next_notification` never falls after `end`
//! - EV5: no stored interval of the same user overlaps `[start, end]`

use std::cmp::{max, min};
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::model::EventStatus;
use super::period::Period;

/// Sentinel key for whole-object errors that have no single offending field
pub const SCHEMA_KEY: &str = "_schema";

/// Default notification lead time when the client omits `next_notification`
const NOTIFICATION_LEAD_MINUTES: i64 = 5;

/// A candidate event submitted for creation or update, not yet persisted.
///
/// All fields are optional so the same shape serves both full (create) and
/// partial (patch) validation. Which absences are errors depends on the
/// validation mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateEvent {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub periodic: Option<bool>,
    pub period: Option<Period>,
    pub next_notification: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub place: Option<String>,
    pub status: Option<EventStatus>,
    pub labels: BTreeSet<String>,
}

/// The `(start, end)` pair of a stored event with a non-null end.
///
/// The comparison set for overlap detection, scoped to one user. On update
/// the caller filters out the event being updated before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Overlap predicate: `max(starts) <= min(ends)`.
    ///
    /// Deliberately non-strict, so intervals touching at a single instant
    /// count as overlapping.
    fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        max(self.start, start) <= min(self.end, end)
    }
}

/// Field-keyed validation failures.
///
/// Maps a field name (or [`SCHEMA_KEY`] for whole-object errors) to a
/// non-empty ordered list of human-readable messages. Serializes as the
/// bare map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Record one message against every named field
    fn add(&mut self, fields: &[&str], message: &str) {
        for field in fields {
            self.errors
                .entry((*field).to_string())
                .or_default()
                .push(message.to_string());
        }
    }

    fn add_schema(&mut self, message: &str) {
        self.add(&[SCHEMA_KEY], message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded against a field, if any
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.errors.get(name).map(Vec::as_slice)
    }

    /// Names of all fields with at least one failure
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.errors
    }
}

/// Validate a candidate event against its own temporal fields and the
/// user's stored intervals.
///
/// Returns the candidate with `next_notification` defaulted to five minutes
/// before `start` when it was omitted, or the accumulated error set.
///
/// In partial mode (`is_partial`), rules whose required fields are absent
/// from the candidate are skipped; rules whose fields are all present still
/// fire. In full mode, `start`, `periodic` and `status` are required.
///
/// Pure and re-entrant: no I/O, no hidden state, identical inputs produce
/// identical results.
pub fn validate(
    candidate: &CandidateEvent,
    existing: &[EventInterval],
    is_partial: bool,
) -> Result<CandidateEvent, ValidationErrors> {
    let mut normalized = candidate.clone();
    let mut errors = ValidationErrors::default();

    if !is_partial {
        for (field, present) in [
            ("start", candidate.start.is_some()),
            ("periodic", candidate.periodic.is_some()),
            ("status", candidate.status.is_some()),
        ] {
            if !present {
                errors.add(&[field], "Missing data for required field");
            }
        }
    }

    check_periodic_consistency(candidate, is_partial, &mut errors);

    // Normalization, not a failure. Skipped when `start` is absent.
    if candidate.next_notification.is_none() {
        if let Some(start) = candidate.start {
            normalized.next_notification =
                Some(start - Duration::minutes(NOTIFICATION_LEAD_MINUTES));
        }
    }

    if let Some(end) = candidate.end {
        check_against_end(&normalized, end, existing, &mut errors);
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}

/// `periodic` and `period` must be both present or both absent.
///
/// In partial mode only the definite conflict fires: `periodic == false`
/// with a supplied `period`. A periodic flag with no supplied period may be
/// satisfied by the stored value, so that direction is skipped.
fn check_periodic_consistency(
    candidate: &CandidateEvent,
    is_partial: bool,
    errors: &mut ValidationErrors,
) {
    let message = "Either both of period and periodic should be specified or none of them";
    match (candidate.periodic, candidate.period) {
        (Some(false), Some(_)) => errors.add(&["period", "periodic"], message),
        (Some(true), None) if !is_partial => errors.add(&["period", "periodic"], message),
        (None, Some(_)) if !is_partial => errors.add(&["period", "periodic"], message),
        _ => {}
    }
}

/// Rules that only apply once an `end` is known.
///
/// An invalid `start > end` ordering short-circuits the remaining
/// end-dependent checks for this run; independently collected errors are
/// kept.
fn check_against_end(
    candidate: &CandidateEvent,
    end: DateTime<Utc>,
    existing: &[EventInterval],
    errors: &mut ValidationErrors,
) {
    if let Some(start) = candidate.start {
        if start > end {
            errors.add(&["start", "end"], "Invalid event borders");
            return;
        }
    }

    if let Some(next_notification) = candidate.next_notification {
        if next_notification > end {
            errors.add(
                &["next_notification"],
                "Next notification should be earlier than end of event",
            );
        }
    }

    if let (Some(period), Some(start)) = (candidate.period, candidate.start) {
        if period.as_duration() >= end - start {
            errors.add(&["period"], "Period must be smaller than start-end time period");
        }
    }

    if let Some(start) = candidate.start {
        // First match suffices; which interval matched is not reported.
        if existing.iter().any(|interval| interval.overlaps(start, end)) {
            errors.add_schema("Event is overlapping with others");
        }
    }
}
