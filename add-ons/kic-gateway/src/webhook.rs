//! Action server endpoints for the dialogue runtime.
//!
//! `POST /webhook` runs `next_action` against the tracker snapshot in the request and answers
//! with the produced events and messages. `GET /actions` lists the registered actions.
//!
//! A latest message that is a button command (`/inform{..}`, `/undecided`) is decoded before the
//! action runs. A malformed command is rejected with 400.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use kic_core::{
    ActionError, ActionEvent, ActionRegistry, BotMessage, CollectingDispatcher,
    ConversationContext, FilterSlot, MemorySessionStore, PayloadError, SlotCommand,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<ActionRegistry>,
}

/// Request body sent by the runtime for one action call.
#[derive(Debug, Deserialize)]
pub struct ActionCall {
    pub next_action: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub tracker: TrackerSnapshot,
}

/// The parts of the runtime's tracker the actions read.
#[derive(Debug, Default, Deserialize)]
pub struct TrackerSnapshot {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub slots: Map<String, Value>,
    #[serde(default)]
    pub latest_message: Option<LatestMessage>,
    #[serde(default)]
    pub events: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LatestMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub intent: Option<IntentName>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IntentName {
    #[serde(default)]
    pub name: Option<String>,
}

impl TrackerSnapshot {
    fn latest_intent(&self) -> Option<String> {
        self.latest_message
            .as_ref()
            .and_then(|m| m.intent.as_ref())
            .and_then(|i| i.name.clone())
    }

    /// The button command the user sent, if the latest message is one.
    ///
    /// Plain text and commands other than `inform`/`undecided` are not button commands.
    pub fn button_command(&self) -> Result<Option<SlotCommand>, PayloadError> {
        let Some(text) = self.latest_message.as_ref().and_then(|m| m.text.as_deref()) else {
            return Ok(None);
        };
        match SlotCommand::parse(text) {
            Ok(command) => Ok(Some(command)),
            Err(
                PayloadError::Empty
                | PayloadError::NotACommand(_)
                | PayloadError::UnsupportedCommand(_),
            ) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Slots set by the trailing run of `slot` events, oldest first.
    pub fn slots_to_validate(&self) -> Vec<(String, Value)> {
        let mut slots: Vec<(String, Value)> = Vec::new();
        for event in self.events.iter().rev() {
            if event.get("event").and_then(Value::as_str) != Some("slot") {
                break;
            }
            let Some(name) = event.get("name").and_then(Value::as_str) else {
                continue;
            };
            if !slots.iter().any(|(n, _)| n == name) {
                let value = event.get("value").cloned().unwrap_or(Value::Null);
                slots.push((name.to_string(), value));
            }
        }
        slots.reverse();
        slots
    }
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub events: Vec<ActionEvent>,
    pub responses: Vec<BotMessage>,
}

#[derive(Debug, Serialize)]
struct ActionList {
    name: String,
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/actions", get(list_actions))
        .route("/webhook", post(run_action))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_actions(State(state): State<GatewayState>) -> Json<Vec<ActionList>> {
    Json(
        state
            .registry
            .action_names()
            .into_iter()
            .map(|name| ActionList { name })
            .collect(),
    )
}

async fn run_action(State(state): State<GatewayState>, Json(call): Json<ActionCall>) -> Response {
    let tracker = &call.tracker;
    let sender_id = if tracker.sender_id.is_empty() {
        call.sender_id.clone().unwrap_or_default()
    } else {
        tracker.sender_id.clone()
    };

    let command = match tracker.button_command() {
        Ok(command) => command,
        Err(e) => return error_response(&call.next_action, ActionError::Payload(e)),
    };

    let store = MemorySessionStore::from_slots(tracker.slots.clone());
    let mut to_validate = tracker.slots_to_validate();
    // A clicked filter value is validated even if the runtime did not set the slot yet.
    if let Some(SlotCommand::Inform { slot, value }) = &command {
        if FilterSlot::from_name(slot).is_some() && !to_validate.iter().any(|(n, _)| n == slot) {
            to_validate.push((slot.clone(), Value::String(value.clone())));
        }
    }
    for (name, value) in &to_validate {
        store.seed(name.clone(), value.clone());
    }
    let mut ctx = ConversationContext::new(sender_id)
        .with_slots_to_validate(to_validate.into_iter().map(|(name, _)| name));
    ctx.latest_intent = tracker
        .latest_intent()
        .or_else(|| command.as_ref().map(|c| c.intent().to_string()));

    let mut dispatcher = CollectingDispatcher::new();
    match state
        .registry
        .run(&call.next_action, &ctx, &store, &mut dispatcher)
        .await
    {
        Ok(events) => {
            tracing::info!(
                target: "kic::gateway",
                action = %call.next_action,
                sender = %ctx.sender_id,
                events = events.len(),
                messages = dispatcher.messages().len(),
                "Action completed"
            );
            Json(ActionResponse {
                events,
                responses: dispatcher.into_messages(),
            })
            .into_response()
        }
        Err(e) => error_response(&call.next_action, e),
    }
}

/// Error body in the runtime's format: `{"error", "action_name"}`.
fn error_response(action_name: &str, e: ActionError) -> Response {
    let status = match e {
        ActionError::NotFound(_) => StatusCode::NOT_FOUND,
        ActionError::Payload(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(target: "kic::gateway", action = %action_name, error = %e, "Action failed");
    (
        status,
        Json(serde_json::json!({
            "error": e.to_string(),
            "action_name": action_name,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use kic_actions::{DeleteSlotValue, Restart, ValidateRecommenderForm};
    use kic_core::ResponseTable;
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Restart));
        registry.register(Arc::new(DeleteSlotValue));
        registry.register(Arc::new(
            ValidateRecommenderForm::new(&ResponseTable::bundled().unwrap()).unwrap(),
        ));
        router(GatewayState {
            registry: Arc::new(registry),
        })
    }

    async fn post_webhook(body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn restart_returns_response_and_event() {
        let (status, body) = post_webhook(json!({
            "next_action": "action_restart",
            "tracker": {"sender_id": "u1", "slots": {}, "events": []}
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"], json!([{"event": "restart"}]));
        assert_eq!(body["responses"], json!([{"response": "utter_restart"}]));
    }

    #[tokio::test]
    async fn change_intent_clears_slot() {
        let (status, body) = post_webhook(json!({
            "next_action": "action_delete_slot_value",
            "tracker": {
                "sender_id": "u1",
                "slots": {"topic": "data science"},
                "latest_message": {"intent": {"name": "change_topic_slot", "confidence": 0.98}},
                "events": []
            }
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"], json!([{"event": "slot", "name": "topic", "value": null}]));
    }

    #[tokio::test]
    async fn validation_reads_trailing_slot_events() {
        let (status, body) = post_webhook(json!({
            "next_action": "validate_recommender_form",
            "tracker": {
                "sender_id": "u1",
                "slots": {"language": "Spanisch", "level": "Profi"},
                "events": [
                    {"event": "slot", "name": "level", "value": "Profi"},
                    {"event": "user", "text": "spanisch bitte"},
                    {"event": "slot", "name": "language", "value": "Spanisch"}
                ]
            }
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["events"],
            json!([{"event": "slot", "name": "language", "value": null}])
        );
        assert!(body["responses"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Spanisch"));
    }

    #[tokio::test]
    async fn clicked_topic_is_validated() {
        let (status, body) = post_webhook(json!({
            "next_action": "validate_recommender_form",
            "tracker": {
                "sender_id": "u1",
                "slots": {},
                "latest_message": {"text": "/inform{\"topic\":\"Quantenphysik\"}"},
                "events": [{"event": "user", "text": "/inform{\"topic\":\"Quantenphysik\"}"}]
            }
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"], json!([{"event": "slot", "name": "topic", "value": null}]));
        assert_eq!(body["responses"], json!([{"response": "utter_unavailable_topic"}]));
    }

    #[tokio::test]
    async fn plain_text_is_not_a_command() {
        let (status, body) = post_webhook(json!({
            "next_action": "validate_recommender_form",
            "tracker": {
                "sender_id": "u1",
                "latest_message": {"text": "/greet"},
                "events": []
            }
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"], json!([]));
    }

    #[tokio::test]
    async fn malformed_command_is_400() {
        let (status, body) = post_webhook(json!({
            "next_action": "validate_recommender_form",
            "tracker": {
                "sender_id": "u1",
                "latest_message": {"text": "/inform{\"language\":"},
                "events": []
            }
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["action_name"], "validate_recommender_form");
        assert!(body["error"].as_str().unwrap().contains("malformed"));
    }

    #[test]
    fn undecided_command_supplies_intent() {
        let tracker: TrackerSnapshot = serde_json::from_value(json!({
            "latest_message": {"text": "/undecided"}
        }))
        .unwrap();
        assert_eq!(tracker.button_command().unwrap(), Some(SlotCommand::Undecided));
        assert_eq!(tracker.latest_intent(), None);
    }

    #[tokio::test]
    async fn unknown_action_is_404() {
        let (status, body) = post_webhook(json!({
            "next_action": "action_check_login",
            "tracker": {"sender_id": "u1"}
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["action_name"], "action_check_login");
    }

    #[tokio::test]
    async fn lists_registered_actions() {
        let req = Request::builder()
            .uri("/actions")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let list: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(list.as_array().unwrap().len(), 3);
        assert_eq!(list[0]["name"], "action_restart");
    }

    #[test]
    fn trailing_slot_events_keep_latest_value() {
        let tracker: TrackerSnapshot = serde_json::from_value(json!({
            "events": [
                {"event": "action", "name": "recommender_form"},
                {"event": "slot", "name": "topic", "value": "ki"},
                {"event": "slot", "name": "certificate", "value": "egal"},
                {"event": "slot", "name": "topic", "value": "Data Science"}
            ]
        }))
        .unwrap();
        assert_eq!(
            tracker.slots_to_validate(),
            vec![
                ("certificate".to_string(), json!("egal")),
                ("topic".to_string(), json!("Data Science")),
            ]
        );
    }
}
