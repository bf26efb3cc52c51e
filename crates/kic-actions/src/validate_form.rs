//! `validate_recommender_form`: normalizes freshly filled filter slots and clears invalid ones.

use kic_core::{
    Action, ActionError, ActionEvent, ActionResponses, BotMessage, CollectingDispatcher,
    ConversationContext, FilterSlot, ResponseTable, ResponseTableError, SessionStore,
};
use serde_json::Value;

const ACTION_NAME: &str = "validate_recommender_form";
const UNSUPPORTED_LANGUAGE: &str = "unsupported_language_selection";

const LANGUAGES: &[&str] = &["deutsch", "englisch", "egal"];
/// Languages users ask for that no course is offered in.
const UNSUPPORTED_LANGUAGES: &[&str] = &[
    "spanisch",
    "französisch",
    "robotisch",
    "russisch",
    "slowakisch",
    "katalanisch",
    "tschechisch",
    "mandarin",
    "hindi",
    "niederländisch",
    "schwedisch",
    "holländisch",
];
const TOPICS: &[&str] = &[
    "ki-einführung",
    "ki-vertiefung",
    "ki-berufsfelder",
    "ki-gesellschaft",
    "data science",
    "maschinelles lernen",
    "egal",
];
const CERTIFICATES: &[&str] = &["teilnahmebescheinigung", "leistungsnachweis", "egal"];
const MAX_DURATIONS: &[&str] = &["0", "10", "50", "51"];
const LEVELS: &[&str] = &["anfänger", "fortgeschritten", "experte"];

/// Runtime-side responses for rejected input.
const LANGUAGE_CLARIFICATION: &str = "utter_interjection_languages";
const TOPIC_UNAVAILABLE: &str = "utter_unavailable_topic";

fn allowed_values(slot: FilterSlot) -> &'static [&'static str] {
    match slot {
        FilterSlot::Language => LANGUAGES,
        FilterSlot::Topic => TOPICS,
        FilterSlot::Level => LEVELS,
        FilterSlot::MaxDuration => MAX_DURATIONS,
        FilterSlot::Certificate => CERTIFICATES,
    }
}

/// Result of validating one slot: the normalized value, or `None` plus an optional correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSlotValue {
    pub slot: FilterSlot,
    pub value: Option<String>,
    pub correction: Option<BotMessage>,
}

impl ValidatedSlotValue {
    fn accepted(slot: FilterSlot, value: String) -> Self {
        Self {
            slot,
            value: Some(value),
            correction: None,
        }
    }

    fn rejected(slot: FilterSlot, correction: Option<BotMessage>) -> Self {
        Self {
            slot,
            value: None,
            correction,
        }
    }
}

pub struct ValidateRecommenderForm {
    responses: ActionResponses,
}

impl ValidateRecommenderForm {
    pub fn new(table: &ResponseTable) -> Result<Self, ResponseTableError> {
        Ok(Self {
            responses: table.for_action(ACTION_NAME, &[UNSUPPORTED_LANGUAGE])?,
        })
    }

    /// Lower-cases `raw` and checks it against the slot's allowed values.
    pub fn validate(&self, slot: FilterSlot, raw: &str) -> ValidatedSlotValue {
        let value = raw.trim().to_lowercase();
        if !value.is_empty() && allowed_values(slot).contains(&value.as_str()) {
            return ValidatedSlotValue::accepted(slot, value);
        }
        let correction = match slot {
            FilterSlot::Language if UNSUPPORTED_LANGUAGES.contains(&value.as_str()) => {
                let text = self
                    .responses
                    .format(UNSUPPORTED_LANGUAGE, &[&capitalize(&value)]);
                Some(BotMessage::text(text))
            }
            FilterSlot::Language => Some(BotMessage::response(LANGUAGE_CLARIFICATION)),
            FilterSlot::Topic => Some(BotMessage::response(TOPIC_UNAVAILABLE)),
            _ => None,
        };
        ValidatedSlotValue::rejected(slot, correction)
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait::async_trait]
impl Action for ValidateRecommenderForm {
    fn name(&self) -> &str {
        ACTION_NAME
    }

    async fn run(
        &self,
        ctx: &ConversationContext,
        store: &dyn SessionStore,
        dispatcher: &mut CollectingDispatcher,
    ) -> Result<Vec<ActionEvent>, ActionError> {
        for name in &ctx.slots_to_validate {
            let Some(slot) = FilterSlot::from_name(name) else {
                continue;
            };
            let raw = store.get_text(name).unwrap_or_default();
            let result = self.validate(slot, &raw);
            if result.value.is_none() {
                tracing::info!(target: "kic::actions", %slot, raw = %raw, "Slot value rejected");
            }
            store.set(
                name,
                result.value.map(Value::String).unwrap_or(Value::Null),
            );
            if let Some(message) = result.correction {
                dispatcher.utter_message(message);
            }
        }
        Ok(Vec::new())
    }
}
