//! Named actions invoked by the host runtime, and the registry that dispatches them.

use crate::dialogue::{ActionEvent, CollectingDispatcher};
use crate::error::ActionError;
use crate::memory::MemorySessionStore;
use crate::shared::{ConversationContext, SessionStore};
use std::sync::Arc;

/// One custom action of the dialogue.
///
/// Slot writes go through `store`; the registry turns them into slot events ahead of the
/// events the action returns.
#[async_trait::async_trait]
pub trait Action: Send + Sync {
    /// Name the runtime uses to call this action.
    fn name(&self) -> &str;

    async fn run(
        &self,
        ctx: &ConversationContext,
        store: &dyn SessionStore,
        dispatcher: &mut CollectingDispatcher,
    ) -> Result<Vec<ActionEvent>, ActionError>;
}

/// Registry of actions that can be dispatched by name.
pub struct ActionRegistry {
    actions: Vec<Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Adds an action; a later registration under the same name replaces the earlier one.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.retain(|a| a.name() != action.name());
        self.actions.push(action);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.iter().find(|a| a.name() == name).cloned()
    }

    pub fn action_names(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.name().to_string()).collect()
    }

    /// Runs `name` against `store` and returns its slot writes as events, followed by the
    /// action's own events.
    pub async fn run(
        &self,
        name: &str,
        ctx: &ConversationContext,
        store: &MemorySessionStore,
        dispatcher: &mut CollectingDispatcher,
    ) -> Result<Vec<ActionEvent>, ActionError> {
        let action = self
            .get(name)
            .ok_or_else(|| ActionError::NotFound(name.to_string()))?;
        tracing::debug!(
            target: "kic::actions",
            action = name,
            sender = %ctx.sender_id,
            "Running action"
        );
        let returned = action.run(ctx, store, dispatcher).await?;
        let mut events: Vec<ActionEvent> = store
            .take_changes()
            .into_iter()
            .map(|(slot, value)| ActionEvent::slot(slot, value))
            .collect();
        events.extend(returned);
        Ok(events)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait::async_trait]
    impl Action for Echo {
        fn name(&self) -> &str {
            "action_echo"
        }

        async fn run(
            &self,
            _ctx: &ConversationContext,
            store: &dyn SessionStore,
            dispatcher: &mut CollectingDispatcher,
        ) -> Result<Vec<ActionEvent>, ActionError> {
            store.set("topic", json!("egal"));
            dispatcher.utter_text("ok");
            Ok(vec![ActionEvent::followup("action_next")])
        }
    }

    #[tokio::test]
    async fn slot_writes_precede_returned_events() {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Echo));
        let store = MemorySessionStore::new();
        let mut dispatcher = CollectingDispatcher::new();
        let events = registry
            .run("action_echo", &ConversationContext::new("u1"), &store, &mut dispatcher)
            .await
            .unwrap();
        assert_eq!(
            events,
            vec![
                ActionEvent::slot("topic", json!("egal")),
                ActionEvent::followup("action_next")
            ]
        );
        assert_eq!(dispatcher.messages().len(), 1);
    }

    #[tokio::test]
    async fn unknown_action_is_not_found() {
        let registry = ActionRegistry::new();
        let store = MemorySessionStore::new();
        let mut dispatcher = CollectingDispatcher::new();
        let err = registry
            .run("action_nope", &ConversationContext::new("u1"), &store, &mut dispatcher)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(name) if name == "action_nope"));
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = ActionRegistry::default();
        registry.register(Arc::new(Echo));
        registry.register(Arc::new(Echo));
        assert_eq!(registry.action_names(), vec!["action_echo".to_string()]);
    }
}
