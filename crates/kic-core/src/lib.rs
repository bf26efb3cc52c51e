//! kic-core: shared building blocks of the KI-Campus course recommender actions.
//!
//! Slots and the session store seam, dialogue messages and runtime events, the action
//! registry, configuration, localized response texts, button payload commands and the
//! recommender API client.

mod action;
mod config;
mod dialogue;
mod error;
mod memory;
mod payload;
mod recommender_service;
mod responses;
mod shared;

pub use action::{Action, ActionRegistry};
pub use config::{EnrollmentPolicy, GatewayConfig, KicConfig, RecommenderConfig};
pub use dialogue::{
    ActionEvent, BotMessage, Button, CollectingDispatcher, EntityRef, IntentRef, ParseData,
};
pub use error::{ActionError, PayloadError, RecommenderError, ResponseTableError};
pub use memory::MemorySessionStore;
pub use payload::{SlotCommand, INFORM_INTENT, UNDECIDED_INTENT, UNDECIDED_VALUE};
pub use recommender_service::{
    CountResult, FilterParams, Recommendation, RecommendationOutcome, RecommenderBackend,
    RecommenderClient, COUNT_TRIGGER,
};
pub use responses::{format_template, ActionResponses, ResponseTable, BUNDLED_RESPONSES};
pub use shared::{
    ConversationContext, FilterSlot, SessionStore, ENROLLMENTS_SLOT, RECOMMENDATIONS_SLOT,
    UNSET_VALUE,
};
