//! # Label Storage
//!
//! Idempotent get-or-create bookkeeping for label records.
//! Invoked only after a candidate event has passed validation.

use std::collections::BTreeSet;
use std::sync::RwLock;

use super::errors::{EventError, EventResult};
use super::model::Label;

/// Label repository trait
pub trait LabelRepository: Send + Sync {
    /// Return persisted labels for every name, creating those that do not
    /// exist yet. Idempotent: repeated calls with the same names return the
    /// same records.
    fn get_or_create_all(&self, names: &BTreeSet<String>) -> EventResult<Vec<Label>>;
}

/// In-memory label repository
#[derive(Debug, Default)]
pub struct InMemoryLabelRepository {
    labels: RwLock<Vec<Label>>,
}

impl InMemoryLabelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LabelRepository for InMemoryLabelRepository {
    fn get_or_create_all(&self, names: &BTreeSet<String>) -> EventResult<Vec<Label>> {
        let mut labels = self
            .labels
            .write()
            .map_err(|_| EventError::StorageError("Lock poisoned".to_string()))?;

        for name in names {
            if !labels.iter().any(|l| &l.name == name) {
                labels.push(Label::new(name.clone()));
            }
        }

        Ok(labels
            .iter()
            .filter(|l| names.contains(&l.name))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_creates_missing_labels() {
        let repo = InMemoryLabelRepository::new();

        let labels = repo.get_or_create_all(&names(&["work", "urgent"])).unwrap();
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let repo = InMemoryLabelRepository::new();

        let first = repo.get_or_create_all(&names(&["work"])).unwrap();
        let second = repo.get_or_create_all(&names(&["work", "home"])).unwrap();

        // The existing record is reused, not recreated.
        let work = second.iter().find(|l| l.name == "work").unwrap();
        assert_eq!(work.id, first[0].id);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_empty_name_set() {
        let repo = InMemoryLabelRepository::new();
        assert!(repo.get_or_create_all(&BTreeSet::new()).unwrap().is_empty());
    }
}
