//! Button payload commands: `/inform{"<slot>":"<value>"}` and the bare `/undecided`.
//!
//! A clicked button is delivered back to the runtime as if the user had typed the command.
//! Auto-applied answers are injected in the same form.

use crate::dialogue::{EntityRef, IntentRef, ParseData};
use crate::error::PayloadError;
use serde_json::{Map, Value};
use std::fmt;

pub const INFORM_INTENT: &str = "inform";
pub const UNDECIDED_INTENT: &str = "undecided";

/// Value recorded for a slot the user does not care about; also the recommender's count key for it.
pub const UNDECIDED_VALUE: &str = "egal";

/// Structured command carried by a button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotCommand {
    Inform { slot: String, value: String },
    Undecided,
}

impl SlotCommand {
    pub fn inform(slot: impl Into<String>, value: impl Into<String>) -> Self {
        SlotCommand::Inform {
            slot: slot.into(),
            value: value.into(),
        }
    }

    /// Wire form of the command.
    pub fn encode(&self) -> String {
        match self {
            SlotCommand::Inform { slot, value } => {
                let mut entities = Map::new();
                entities.insert(slot.clone(), Value::String(value.clone()));
                format!("/{}{}", INFORM_INTENT, Value::Object(entities))
            }
            SlotCommand::Undecided => format!("/{}", UNDECIDED_INTENT),
        }
    }

    /// Parses a payload such as `/inform{"language":"Deutsch"}`.
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(PayloadError::Empty);
        }
        let body = payload
            .strip_prefix('/')
            .ok_or_else(|| PayloadError::NotACommand(payload.to_string()))?;
        let (intent, entities) = match body.find('{') {
            Some(idx) => (&body[..idx], Some(&body[idx..])),
            None => (body, None),
        };
        match (intent, entities) {
            (UNDECIDED_INTENT, None) => Ok(SlotCommand::Undecided),
            (INFORM_INTENT, Some(raw)) => {
                let parsed: Map<String, Value> = serde_json::from_str(raw)
                    .map_err(|_| PayloadError::MalformedEntities(payload.to_string()))?;
                let mut iter = parsed.into_iter();
                match (iter.next(), iter.next()) {
                    (Some((slot, Value::String(value))), None) => {
                        Ok(SlotCommand::Inform { slot, value })
                    }
                    _ => Err(PayloadError::MalformedEntities(payload.to_string())),
                }
            }
            (INFORM_INTENT, None) => Err(PayloadError::MalformedEntities(payload.to_string())),
            (other, _) => Err(PayloadError::UnsupportedCommand(other.to_string())),
        }
    }

    /// The value this command stands for when matched against recommender count keys.
    pub fn match_value(&self) -> &str {
        match self {
            SlotCommand::Inform { value, .. } => value,
            SlotCommand::Undecided => UNDECIDED_VALUE,
        }
    }

    pub fn intent(&self) -> &'static str {
        match self {
            SlotCommand::Inform { .. } => INFORM_INTENT,
            SlotCommand::Undecided => UNDECIDED_INTENT,
        }
    }

    /// NLU result equivalent to the user sending this command.
    pub fn parse_data(&self) -> ParseData {
        let entities = match self {
            SlotCommand::Inform { slot, value } => vec![EntityRef {
                entity: slot.clone(),
                value: Value::String(value.clone()),
            }],
            SlotCommand::Undecided => Vec::new(),
        };
        ParseData {
            intent: IntentRef {
                name: self.intent().to_string(),
                confidence: 1.0,
            },
            entities,
        }
    }
}

impl fmt::Display for SlotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
