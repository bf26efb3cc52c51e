//! Clearing filter slots and restarting the conversation.

use crate::catalog::SLOT_PROFILES;
use kic_core::{
    Action, ActionError, ActionEvent, BotMessage, CollectingDispatcher, ConversationContext,
    FilterSlot, SessionStore,
};
use serde_json::Value;

const DELETE_ACTION_NAME: &str = "action_delete_slot_value";
const RESTART_ACTION_NAME: &str = "action_restart";
const START_FORM_INTENT: &str = "start_recommender_form";
const RESTART_RESPONSE: &str = "utter_restart";

/// Clears the slot named by a `change_<slot>_slot` intent, or all filter slots when the
/// recommender form is started over.
pub struct DeleteSlotValue;

impl DeleteSlotValue {
    fn slots_to_clear(ctx: &ConversationContext) -> Vec<FilterSlot> {
        if ctx.intent_is(START_FORM_INTENT) {
            return FilterSlot::ALL.to_vec();
        }
        SLOT_PROFILES
            .iter()
            .filter(|profile| ctx.intent_is(profile.change_intent))
            .map(|profile| profile.slot)
            .collect()
    }
}

#[async_trait::async_trait]
impl Action for DeleteSlotValue {
    fn name(&self) -> &str {
        DELETE_ACTION_NAME
    }

    async fn run(
        &self,
        ctx: &ConversationContext,
        store: &dyn SessionStore,
        _dispatcher: &mut CollectingDispatcher,
    ) -> Result<Vec<ActionEvent>, ActionError> {
        let slots = Self::slots_to_clear(ctx);
        if !slots.is_empty() {
            tracing::debug!(
                target: "kic::actions",
                intent = ?ctx.latest_intent,
                cleared = slots.len(),
                "Clearing filter slots"
            );
        }
        for slot in slots {
            store.set(slot.as_str(), Value::Null);
        }
        Ok(Vec::new())
    }
}

pub struct Restart;

#[async_trait::async_trait]
impl Action for Restart {
    fn name(&self) -> &str {
        RESTART_ACTION_NAME
    }

    async fn run(
        &self,
        _ctx: &ConversationContext,
        _store: &dyn SessionStore,
        dispatcher: &mut CollectingDispatcher,
    ) -> Result<Vec<ActionEvent>, ActionError> {
        dispatcher.utter_message(BotMessage::response(RESTART_RESPONSE));
        Ok(vec![ActionEvent::Restarted])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kic_core::MemorySessionStore;
    use serde_json::json;

    async fn delete_with(intent: &str) -> Vec<(String, Value)> {
        let store = MemorySessionStore::from_slots([("language", json!("deutsch"))]);
        let ctx = ConversationContext::new("u1").with_intent(intent);
        DeleteSlotValue
            .run(&ctx, &store, &mut CollectingDispatcher::new())
            .await
            .unwrap();
        store.take_changes()
    }

    #[tokio::test]
    async fn change_intent_clears_one_slot() {
        assert_eq!(
            delete_with("change_max_duration_slot").await,
            vec![("max_duration".to_string(), Value::Null)]
        );
    }

    #[tokio::test]
    async fn starting_the_form_clears_all_filter_slots() {
        let cleared: Vec<String> = delete_with("start_recommender_form")
            .await
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(cleared, vec!["language", "topic", "level", "max_duration", "certificate"]);
    }

    #[tokio::test]
    async fn other_intents_clear_nothing() {
        assert!(delete_with("greet").await.is_empty());
    }

    #[tokio::test]
    async fn restart_utters_and_restarts() {
        let mut dispatcher = CollectingDispatcher::new();
        let events = Restart
            .run(&ConversationContext::new("u1"), &MemorySessionStore::new(), &mut dispatcher)
            .await
            .unwrap();
        assert_eq!(events, vec![ActionEvent::Restarted]);
        assert_eq!(dispatcher.messages()[0], BotMessage::response("utter_restart"));
    }
}
