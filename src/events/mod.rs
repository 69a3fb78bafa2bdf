//! # Eventum Events Module
//!
//! This module provides the event scheduling core: the temporal validator
//! with overlap detection, the persisted event model, repositories and the
//! orchestrating service.

pub mod errors;
pub mod labels;
pub mod model;
pub mod period;
pub mod service;
pub mod store;
pub mod validate;

pub use errors::{EventError, EventResult};
pub use labels::{InMemoryLabelRepository, LabelRepository};
pub use model::{Event, EventStatus, Label};
pub use period::Period;
pub use service::EventService;
pub use store::{EventRepository, InMemoryEventRepository};
pub use validate::{validate, CandidateEvent, EventInterval, ValidationErrors, SCHEMA_KEY};
