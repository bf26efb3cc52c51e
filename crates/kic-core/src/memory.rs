//! In-memory session store: current slot values (DashMap) plus a journal of the writes made
//! during the turn.

use crate::shared::SessionStore;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

/// Slot snapshot for one conversation turn.
///
/// The host adapter seeds it from the runtime's tracker, runs one action against it and turns
/// [`MemorySessionStore::take_changes`] into slot events. Seeding is not journaled.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: DashMap<String, Value>,
    journal: Mutex<Vec<(String, Value)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from existing slot values without recording them as changes.
    pub fn from_slots<I, K>(slots: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let store = Self::new();
        for (key, value) in slots {
            store.seed(key, value);
        }
        store
    }

    /// Overwrites a value without journaling it (runtime-side state, not an action write).
    pub fn seed(&self, key: impl Into<String>, value: Value) {
        self.slots.insert(key.into(), value);
    }

    /// Writes made through [`SessionStore::set`] since the last call, in order.
    pub fn take_changes(&self) -> Vec<(String, Value)> {
        let mut journal = self.journal.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *journal)
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.slots.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: Value) {
        self.slots.insert(key.to_string(), value.clone());
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((key.to_string(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seeded_values_are_not_journaled() {
        let store = MemorySessionStore::from_slots([("language", json!("deutsch"))]);
        assert_eq!(store.get("language"), Some(json!("deutsch")));
        assert!(store.take_changes().is_empty());
    }

    #[test]
    fn writes_are_journaled_in_order() {
        let store = MemorySessionStore::new();
        store.set("topic", json!("data science"));
        store.set("level", Value::Null);
        assert_eq!(store.get_text("topic").as_deref(), Some("data science"));
        assert_eq!(store.get_text("level"), None);
        let changes = store.take_changes();
        assert_eq!(
            changes,
            vec![
                ("topic".to_string(), json!("data science")),
                ("level".to_string(), Value::Null)
            ]
        );
        assert!(store.take_changes().is_empty());
    }
}
