//! Messages and events exchanged with the host dialogue runtime.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Selectable answer attached to a bot message. `payload` is sent back verbatim when clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub title: String,
    pub payload: String,
}

impl Button {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }
}

/// One outgoing message: literal text, buttons, or the name of a runtime-side response template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
    /// Response template rendered by the runtime itself (e.g. `utter_restart`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl BotMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_buttons(text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self {
            text: Some(text.into()),
            buttons,
            response: None,
        }
    }

    pub fn buttons(buttons: Vec<Button>) -> Self {
        Self {
            buttons,
            ..Default::default()
        }
    }

    pub fn response(name: impl Into<String>) -> Self {
        Self {
            response: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Collects the messages an action emits during one turn.
#[derive(Debug, Default)]
pub struct CollectingDispatcher {
    messages: Vec<BotMessage>,
}

impl CollectingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utter_message(&mut self, message: BotMessage) {
        self.messages.push(message);
    }

    pub fn utter_text(&mut self, text: impl Into<String>) {
        self.utter_message(BotMessage::text(text));
    }

    pub fn messages(&self) -> &[BotMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<BotMessage> {
        self.messages
    }
}

/// Intent part of a synthetic user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRef {
    pub name: String,
    pub confidence: f64,
}

/// Entity part of a synthetic user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity: String,
    pub value: Value,
}

/// NLU result attached to a synthetic user message, so the runtime skips classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseData {
    pub intent: IntentRef,
    #[serde(default)]
    pub entities: Vec<EntityRef>,
}

/// Runtime event produced by an action, in the runtime's wire shape (`{"event": ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ActionEvent {
    #[serde(rename = "slot")]
    SlotSet { name: String, value: Value },
    #[serde(rename = "followup")]
    FollowupAction { name: String },
    #[serde(rename = "user")]
    UserUttered { text: String, parse_data: ParseData },
    #[serde(rename = "restart")]
    Restarted,
}

impl ActionEvent {
    pub fn slot(name: impl Into<String>, value: Value) -> Self {
        ActionEvent::SlotSet {
            name: name.into(),
            value,
        }
    }

    pub fn followup(name: impl Into<String>) -> Self {
        ActionEvent::FollowupAction { name: name.into() }
    }
}
