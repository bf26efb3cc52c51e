//! Actions of the KI-Campus course recommender dialogue.
//!
//! Slot questions prune their answer options with live course counts, the form validator
//! normalizes answers, and the recommendation actions fetch and page through matching courses.

mod ask_slot;
mod catalog;
mod filter_params;
mod option_pruner;
mod pagination;
mod recommendation;
mod slot_reset;
mod validate_form;

pub use ask_slot::{AskSlot, SlotQuestion};
pub use catalog::{profile_for, CandidateOption, OptionDef, SlotProfile, NEXT_ACTION, SLOT_PROFILES};
pub use filter_params::{assemble, enrollment_codes};
pub use option_pruner::prune;
pub use pagination::{course_title, Page, PageTemplates, RecommendationBatch, PAGE_SIZE};
pub use recommendation::{AdditionalLearningRecommendation, GetLearningRecommendation};
pub use slot_reset::{DeleteSlotValue, Restart};
pub use validate_form::{ValidateRecommenderForm, ValidatedSlotValue};

use kic_core::{
    ActionError, ActionRegistry, EnrollmentPolicy, FilterSlot, RecommenderBackend, ResponseTable,
};
use std::sync::Arc;

/// Registers every recommender action.
///
/// Fails with [`ActionError::Responses`] if a response text an action uses is missing.
pub fn register_actions(
    registry: &mut ActionRegistry,
    backend: Arc<dyn RecommenderBackend>,
    responses: &ResponseTable,
    policy: EnrollmentPolicy,
) -> Result<(), ActionError> {
    for slot in FilterSlot::ALL {
        registry.register(Arc::new(AskSlot::new(
            slot,
            responses,
            Arc::clone(&backend),
            policy,
        )?));
    }
    registry.register(Arc::new(ValidateRecommenderForm::new(responses)?));
    registry.register(Arc::new(GetLearningRecommendation::new(
        responses,
        Arc::clone(&backend),
        policy,
    )?));
    registry.register(Arc::new(AdditionalLearningRecommendation::new(responses)?));
    registry.register(Arc::new(DeleteSlotValue));
    registry.register(Arc::new(Restart));
    tracing::info!(
        target: "kic::actions",
        actions = registry.action_names().len(),
        "Recommender actions registered"
    );
    Ok(())
}
