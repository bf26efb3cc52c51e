//! Course recommendation retrieval and "show more" paging.

use crate::filter_params::assemble;
use crate::pagination::{render_page, PageTemplates, RecommendationBatch};
use kic_core::{
    Action, ActionError, ActionEvent, ActionResponses, CollectingDispatcher, ConversationContext,
    EnrollmentPolicy, RecommendationOutcome, RecommenderBackend, ResponseTable,
    ResponseTableError, SessionStore, RECOMMENDATIONS_SLOT,
};
use serde_json::Value;
use std::sync::Arc;

const GET_ACTION_NAME: &str = "action_get_learning_recommendation";
const ADDITIONAL_ACTION_NAME: &str = "action_additional_learning_recommendation";

const FIRST_PAGE: PageTemplates = PageTemplates {
    header: "found_recommendations",
    header_single: "found_recommendations_single",
    item: "found_course_item",
    item_search: "found_course_item_search",
    more_single: "found_recommendations_more_single",
    more_multiple: "found_recommendations_more_multiple",
};

const NEXT_PAGE: PageTemplates = PageTemplates {
    header: "additional_recommendations",
    header_single: "additional_recommendations_single",
    item: "additional_course_item",
    item_search: "additional_course_item_search",
    more_single: "additional_recommendations_more_single",
    more_multiple: "additional_recommendations_more_multiple",
};

const NO_RECOMMENDATIONS: &str = "no_recommendations_found";
const NO_MORE_RECOMMENDATIONS: &str = "no_more_recommendations";
const ERROR_401: &str = "error_401";
const ERROR_404: &str = "error_404";
const ERROR_500: &str = "error_500";
const ERROR_UNKNOWN: &str = "error_unknown";

/// Queries the recommender with the full filter and shows the first page.
pub struct GetLearningRecommendation {
    responses: ActionResponses,
    backend: Arc<dyn RecommenderBackend>,
    policy: EnrollmentPolicy,
}

impl GetLearningRecommendation {
    pub fn new(
        table: &ResponseTable,
        backend: Arc<dyn RecommenderBackend>,
        policy: EnrollmentPolicy,
    ) -> Result<Self, ResponseTableError> {
        let mut required = FIRST_PAGE.keys().to_vec();
        required.extend([
            NO_RECOMMENDATIONS,
            ERROR_401,
            ERROR_404,
            ERROR_500,
            ERROR_UNKNOWN,
        ]);
        Ok(Self {
            responses: table.for_action(GET_ACTION_NAME, &required)?,
            backend,
            policy,
        })
    }
}

#[async_trait::async_trait]
impl Action for GetLearningRecommendation {
    fn name(&self) -> &str {
        GET_ACTION_NAME
    }

    async fn run(
        &self,
        _ctx: &ConversationContext,
        store: &dyn SessionStore,
        dispatcher: &mut CollectingDispatcher,
    ) -> Result<Vec<ActionEvent>, ActionError> {
        let params = assemble(store, self.policy);
        let outcome = match self.backend.filtered_recommendations(&params).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(target: "kic::actions", error = %e, "Recommendation query failed");
                let text = self.responses.format(ERROR_UNKNOWN, &[&e]);
                report_failure(store, dispatcher, text);
                return Ok(Vec::new());
            }
        };

        match outcome {
            RecommendationOutcome::Success(courses) => {
                let batch = RecommendationBatch::new(courses);
                batch.save(store)?;
                render_page(&batch.first_page(), &self.responses, &FIRST_PAGE, dispatcher);
            }
            RecommendationOutcome::EmptyResult => {
                store.set(RECOMMENDATIONS_SLOT, Value::Array(Vec::new()));
                dispatcher.utter_text(self.responses.text(NO_RECOMMENDATIONS));
            }
            RecommendationOutcome::Unauthorized => {
                report_failure(store, dispatcher, self.responses.text(ERROR_401))
            }
            RecommendationOutcome::NotFound => {
                report_failure(store, dispatcher, self.responses.text(ERROR_404))
            }
            RecommendationOutcome::ServerError => {
                report_failure(store, dispatcher, self.responses.text(ERROR_500))
            }
            RecommendationOutcome::UnknownError { body, .. } => {
                let text = self.responses.format(ERROR_UNKNOWN, &[&body]);
                report_failure(store, dispatcher, text)
            }
        }
        Ok(Vec::new())
    }
}

/// Failed queries leave no batch to page through.
fn report_failure(
    store: &dyn SessionStore,
    dispatcher: &mut CollectingDispatcher,
    text: impl Into<String>,
) {
    store.set(RECOMMENDATIONS_SLOT, Value::Null);
    dispatcher.utter_text(text);
}

/// Shows the next page of the stored recommendations.
pub struct AdditionalLearningRecommendation {
    responses: ActionResponses,
}

impl AdditionalLearningRecommendation {
    pub fn new(table: &ResponseTable) -> Result<Self, ResponseTableError> {
        let mut required = NEXT_PAGE.keys().to_vec();
        required.push(NO_MORE_RECOMMENDATIONS);
        Ok(Self {
            responses: table.for_action(ADDITIONAL_ACTION_NAME, &required)?,
        })
    }
}

#[async_trait::async_trait]
impl Action for AdditionalLearningRecommendation {
    fn name(&self) -> &str {
        ADDITIONAL_ACTION_NAME
    }

    async fn run(
        &self,
        _ctx: &ConversationContext,
        store: &dyn SessionStore,
        dispatcher: &mut CollectingDispatcher,
    ) -> Result<Vec<ActionEvent>, ActionError> {
        match RecommendationBatch::load(store).next_page() {
            Some((page, rest)) => {
                rest.save(store)?;
                render_page(&page, &self.responses, &NEXT_PAGE, dispatcher);
            }
            None => dispatcher.utter_text(self.responses.text(NO_MORE_RECOMMENDATIONS)),
        }
        Ok(Vec::new())
    }
}
