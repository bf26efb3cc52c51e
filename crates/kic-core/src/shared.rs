//! Shared types: filter slots, the session store seam and the per-turn conversation context.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Textual form of an unset slot. The recommender expects every filter parameter to be present.
pub const UNSET_VALUE: &str = "None";

/// Session slot holding the user's enrolled courses (profile data, read-only for the actions).
pub const ENROLLMENTS_SLOT: &str = "enrollments";

/// Session slot holding the recommendation batch that starts at the page shown last.
pub const RECOMMENDATIONS_SLOT: &str = "recommendations";

/// The five slots of the course filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSlot {
    Language,
    Topic,
    Level,
    MaxDuration,
    Certificate,
}

impl FilterSlot {
    /// All filter slots in the order they are asked.
    pub const ALL: [FilterSlot; 5] = [
        FilterSlot::Language,
        FilterSlot::Topic,
        FilterSlot::Level,
        FilterSlot::MaxDuration,
        FilterSlot::Certificate,
    ];

    /// Slot name as used by the host runtime and as query parameter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterSlot::Language => "language",
            FilterSlot::Topic => "topic",
            FilterSlot::Level => "level",
            FilterSlot::MaxDuration => "max_duration",
            FilterSlot::Certificate => "certificate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        FilterSlot::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for FilterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot storage owned by the host runtime.
///
/// Actions re-read every value they need at the start of a turn and never cache it.
/// Setting `Value::Null` clears a slot.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value);

    /// Slot value as text; absent, null and empty values read as `None`.
    fn get_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// Per-turn context handed to an action by the host runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Conversation id assigned by the host runtime.
    pub sender_id: String,
    /// Intent of the latest user message, when the runtime classified one.
    #[serde(default)]
    pub latest_intent: Option<String>,
    /// Slots filled by the latest user input that still need validation.
    #[serde(default)]
    pub slots_to_validate: Vec<String>,
}

impl ConversationContext {
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            ..Default::default()
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.latest_intent = Some(intent.into());
        self
    }

    pub fn with_slots_to_validate<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots_to_validate = slots.into_iter().map(Into::into).collect();
        self
    }

    /// True when the latest user intent equals `intent`.
    pub fn intent_is(&self, intent: &str) -> bool {
        self.latest_intent.as_deref() == Some(intent)
    }
}
