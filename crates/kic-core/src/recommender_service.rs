//! Client for the KI-Campus course recommender API.
//!
//! Two endpoints, both `GET` with `Authorization: Token <token>`:
//! - `count_filtered_recommendation_learnings/`: number of matching courses per value of one
//!   filter field (the field is set to [`COUNT_TRIGGER`], all others stay fixed).
//! - `filtered_recommendation_learnings/`: the ranked course list for the full filter.

use crate::config::RecommenderConfig;
use crate::error::RecommenderError;
use crate::shared::FilterSlot;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Field value that asks the count endpoint to count per distinct value of that field.
pub const COUNT_TRIGGER: &str = "zaehle";

const COUNT_ENDPOINT: &str = "count_filtered_recommendation_learnings/";
const RECOMMENDATION_ENDPOINT: &str = "filtered_recommendation_learnings/";

/// Query parameters shared by both endpoints. Unset slots carry their textual unset form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    pub language: String,
    pub topic: String,
    pub level: String,
    pub max_duration: String,
    pub certificate: String,
    #[serde(default)]
    pub enrollments: Vec<String>,
}

impl FilterParams {
    pub fn value(&self, slot: FilterSlot) -> &str {
        match slot {
            FilterSlot::Language => &self.language,
            FilterSlot::Topic => &self.topic,
            FilterSlot::Level => &self.level,
            FilterSlot::MaxDuration => &self.max_duration,
            FilterSlot::Certificate => &self.certificate,
        }
    }

    pub fn value_mut(&mut self, slot: FilterSlot) -> &mut String {
        match slot {
            FilterSlot::Language => &mut self.language,
            FilterSlot::Topic => &mut self.topic,
            FilterSlot::Level => &mut self.level,
            FilterSlot::MaxDuration => &mut self.max_duration,
            FilterSlot::Certificate => &mut self.certificate,
        }
    }

    /// Copy with `slot` replaced by the count trigger.
    pub fn counting(&self, slot: FilterSlot) -> Self {
        let mut params = self.clone();
        *params.value_mut(slot) = COUNT_TRIGGER.to_string();
        params
    }

    /// Query pairs; enrollments are sent as one repeated `enrollments` pair per course.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = FilterSlot::ALL
            .iter()
            .map(|slot| (slot.as_str(), self.value(*slot).to_string()))
            .collect();
        query.extend(
            self.enrollments
                .iter()
                .map(|code| ("enrollments", code.clone())),
        );
        query
    }
}

/// Per-value course counts for one filter field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResult {
    /// Name of the counted field.
    pub param: String,
    pub values: BTreeMap<String, u64>,
    /// Counts keyed by alternate value names, used for options the primary keys do not match.
    #[serde(default)]
    pub alternatives: Option<BTreeMap<String, u64>>,
}

/// One recommended course, in service order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    #[serde(default)]
    pub course_code: Option<String>,
}

impl Recommendation {
    pub fn new(name: impl Into<String>, course_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            course_code: Some(course_code.into()),
        }
    }

    /// Course code, if the service returned a non-empty one.
    pub fn code(&self) -> Option<&str> {
        self.course_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Classified result of a recommendation query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationOutcome {
    Success(Vec<Recommendation>),
    EmptyResult,
    Unauthorized,
    NotFound,
    ServerError,
    UnknownError { status: u16, body: String },
}

impl RecommendationOutcome {
    /// Maps a non-200 status and body to its outcome.
    pub fn from_failure(status: u16, body: String) -> Self {
        match status {
            401 => RecommendationOutcome::Unauthorized,
            404 => RecommendationOutcome::NotFound,
            500 => RecommendationOutcome::ServerError,
            _ => RecommendationOutcome::UnknownError { status, body },
        }
    }
}

/// Recommender operations used by the actions.
#[async_trait::async_trait]
pub trait RecommenderBackend: Send + Sync {
    /// Counts per value of `slot`, all other fields of `params` fixed.
    /// `Err` means no counts are available; callers must not prune on it.
    async fn count_options(
        &self,
        slot: FilterSlot,
        params: &FilterParams,
    ) -> Result<CountResult, RecommenderError>;

    /// Ranked recommendations for `params`. Transport and decode failures are `Err`.
    async fn filtered_recommendations(
        &self,
        params: &FilterParams,
    ) -> Result<RecommendationOutcome, RecommenderError>;
}

/// reqwest-based recommender client.
pub struct RecommenderClient {
    base_url: String,
    token: String,
    debug: bool,
    client: reqwest::Client,
}

impl RecommenderClient {
    pub fn new(config: &RecommenderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        if !config.is_configured() {
            tracing::warn!(
                target: "kic::recommender",
                "No configuration for recommender (recommender_api.url / token)"
            );
        }
        Self {
            base_url: config.url.trim().to_string(),
            token: config.token.trim().to_string(),
            debug: config.debug,
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get(
        &self,
        path: &str,
        params: &FilterParams,
    ) -> Result<(u16, HeaderMap, String), RecommenderError> {
        let res = self
            .client
            .get(self.endpoint(path))
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Token {}", self.token))
            .query(&params.to_query())
            .send()
            .await?;
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.text().await?;
        Ok((status, headers, body))
    }

    /// Structured record of a failed call; only logged in debug mode.
    fn log_diagnostic(&self, endpoint: &str, status: u16, headers: &HeaderMap, body: &str) {
        if self.debug {
            tracing::info!(
                target: "kic::diagnostics",
                endpoint,
                status,
                headers = ?headers,
                body,
                "Recommender call failed"
            );
        }
    }
}

#[async_trait::async_trait]
impl RecommenderBackend for RecommenderClient {
    async fn count_options(
        &self,
        slot: FilterSlot,
        params: &FilterParams,
    ) -> Result<CountResult, RecommenderError> {
        let (status, headers, body) = self.get(COUNT_ENDPOINT, &params.counting(slot)).await?;
        if status >= 400 {
            tracing::warn!(target: "kic::recommender", %slot, status, "Option count query failed");
            self.log_diagnostic(COUNT_ENDPOINT, status, &headers, &body);
            return Err(RecommenderError::Status { status, body });
        }
        let counts: CountResult = serde_json::from_str(&body)?;
        tracing::debug!(
            target: "kic::recommender",
            %slot,
            values = counts.values.len(),
            "Option counts received"
        );
        Ok(counts)
    }

    async fn filtered_recommendations(
        &self,
        params: &FilterParams,
    ) -> Result<RecommendationOutcome, RecommenderError> {
        if self.debug {
            tracing::info!(target: "kic::diagnostics", ?params, "Recommendation filter parameters");
        }
        let (status, headers, body) = self.get(RECOMMENDATION_ENDPOINT, params).await?;
        if status != 200 {
            tracing::warn!(target: "kic::recommender", status, "Recommendation query failed");
            self.log_diagnostic(RECOMMENDATION_ENDPOINT, status, &headers, &body);
            return Ok(RecommendationOutcome::from_failure(status, body));
        }
        let courses: Vec<Recommendation> = serde_json::from_str(&body)?;
        tracing::info!(
            target: "kic::recommender",
            found = courses.len(),
            "Recommendations received"
        );
        if courses.is_empty() {
            Ok(RecommendationOutcome::EmptyResult)
        } else {
            Ok(RecommendationOutcome::Success(courses))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FilterParams {
        FilterParams {
            language: "deutsch".to_string(),
            topic: "None".to_string(),
            level: "anfänger".to_string(),
            max_duration: "10".to_string(),
            certificate: "egal".to_string(),
            enrollments: vec!["kurs-a".to_string(), "kurs-b".to_string()],
        }
    }

    #[test]
    fn counting_replaces_only_target_field() {
        let counting = params().counting(FilterSlot::Topic);
        assert_eq!(counting.topic, "zaehle");
        assert_eq!(counting.language, "deutsch");
        assert_eq!(counting.enrollments, params().enrollments);
    }

    #[test]
    fn query_repeats_enrollments() {
        let query = params().to_query();
        assert_eq!(query[0], ("language", "deutsch".to_string()));
        assert_eq!(query[3], ("max_duration", "10".to_string()));
        let enrollments: Vec<&str> = query
            .iter()
            .filter(|(k, _)| *k == "enrollments")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(enrollments, vec!["kurs-a", "kurs-b"]);
    }

    #[test]
    fn failure_statuses_are_classified() {
        let classify = |status| RecommendationOutcome::from_failure(status, String::new());
        assert_eq!(classify(401), RecommendationOutcome::Unauthorized);
        assert_eq!(classify(404), RecommendationOutcome::NotFound);
        assert_eq!(classify(500), RecommendationOutcome::ServerError);
        assert_eq!(
            RecommendationOutcome::from_failure(418, "teapot".to_string()),
            RecommendationOutcome::UnknownError { status: 418, body: "teapot".to_string() }
        );
    }

    #[test]
    fn empty_course_code_is_absent() {
        let course: Recommendation =
            serde_json::from_str(r#"{"name": "KI für alle", "course_code": ""}"#).unwrap();
        assert_eq!(course.code(), None);
        let course: Recommendation = serde_json::from_str(r#"{"name": "KI für alle"}"#).unwrap();
        assert_eq!(course.code(), None);
        assert_eq!(Recommendation::new("X", "ki-101").code(), Some("ki-101"));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = RecommenderClient::new(&RecommenderConfig {
            url: "https://recommender.test/api/".to_string(),
            token: "t".to_string(),
            ..Default::default()
        });
        assert_eq!(
            client.endpoint(COUNT_ENDPOINT),
            "https://recommender.test/api/count_filtered_recommendation_learnings/"
        );
    }
}
