//! Slot question controller: asks for one filter slot, or answers it on the user's behalf when
//! the live course counts leave no real choice.

use crate::catalog::{profile_for, CandidateOption, SlotProfile, NEXT_ACTION};
use crate::filter_params::assemble;
use crate::option_pruner::prune;
use kic_core::{
    Action, ActionError, ActionEvent, ActionResponses, BotMessage, Button, CollectingDispatcher,
    ConversationContext, EnrollmentPolicy, FilterSlot, RecommenderBackend, ResponseTable,
    ResponseTableError, SessionStore, SlotCommand,
};
use serde_json::Value;
use std::sync::Arc;

/// Outcome of one slot question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotQuestion {
    /// Ask the user, offering `options` as buttons.
    Prompt {
        text: String,
        options: Vec<CandidateOption>,
    },
    /// Fill the slot with `value` as if the user had sent `command`, then continue with
    /// `next_action`.
    AutoApply {
        slot: FilterSlot,
        value: String,
        command: SlotCommand,
        next_action: &'static str,
    },
}

/// `action_ask_<slot>` for one filter slot.
pub struct AskSlot {
    profile: &'static SlotProfile,
    responses: ActionResponses,
    backend: Arc<dyn RecommenderBackend>,
    policy: EnrollmentPolicy,
}

impl AskSlot {
    pub fn new(
        slot: FilterSlot,
        table: &ResponseTable,
        backend: Arc<dyn RecommenderBackend>,
        policy: EnrollmentPolicy,
    ) -> Result<Self, ResponseTableError> {
        let profile = profile_for(slot);
        let responses = table.for_action(profile.action_name, &profile.response_keys())?;
        Ok(Self {
            profile,
            responses,
            backend,
            policy,
        })
    }

    /// Counts, prunes and decides. A failed count query keeps the full option list.
    pub async fn decide(
        &self,
        ctx: &ConversationContext,
        store: &dyn SessionStore,
    ) -> SlotQuestion {
        let slot = self.profile.slot;
        let params = assemble(store, self.policy);
        let candidates = self.profile.candidates(&self.responses);
        let options = match self.backend.count_options(slot, &params).await {
            Ok(counts) => prune(candidates, &counts),
            Err(e) => {
                tracing::warn!(
                    target: "kic::actions",
                    %slot,
                    error = %e,
                    "Option counts unavailable, asking without pruning"
                );
                candidates
            }
        };

        match options.len() {
            0 => SlotQuestion::AutoApply {
                slot,
                value: self.profile.undecided_value.to_string(),
                command: self.profile.undecided_command(),
                next_action: NEXT_ACTION,
            },
            1 => SlotQuestion::AutoApply {
                slot,
                value: options[0].command.match_value().to_lowercase(),
                command: options[0].command.clone(),
                next_action: NEXT_ACTION,
            },
            _ => {
                let key = if ctx.intent_is(self.profile.change_intent) {
                    self.profile.confirm_change_key
                } else {
                    self.profile.ask_key
                };
                SlotQuestion::Prompt {
                    text: self.responses.text(key).to_string(),
                    options,
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Action for AskSlot {
    fn name(&self) -> &str {
        self.profile.action_name
    }

    async fn run(
        &self,
        ctx: &ConversationContext,
        store: &dyn SessionStore,
        dispatcher: &mut CollectingDispatcher,
    ) -> Result<Vec<ActionEvent>, ActionError> {
        match self.decide(ctx, store).await {
            SlotQuestion::Prompt { text, options } => {
                let buttons = options
                    .into_iter()
                    .map(|o| Button::new(o.title, o.command.encode()))
                    .collect();
                dispatcher.utter_message(BotMessage::with_buttons(text, buttons));
                Ok(Vec::new())
            }
            SlotQuestion::AutoApply {
                slot,
                value,
                command,
                next_action,
            } => {
                tracing::info!(
                    target: "kic::actions",
                    %slot,
                    value = %value,
                    "Slot answered without asking"
                );
                store.set(slot.as_str(), Value::String(value));
                Ok(vec![
                    ActionEvent::UserUttered {
                        text: command.encode(),
                        parse_data: command.parse_data(),
                    },
                    ActionEvent::followup(next_action),
                ])
            }
        }
    }
}
