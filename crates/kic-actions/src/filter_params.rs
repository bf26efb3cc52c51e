//! Builds recommender query parameters from the current slot values.

use kic_core::{
    EnrollmentPolicy, FilterParams, FilterSlot, SessionStore, ENROLLMENTS_SLOT, UNSET_VALUE,
};
use serde_json::Value;

/// Reads the five filter slots and the enrollments from `store`.
///
/// Unset slots are sent as [`UNSET_VALUE`], never left out.
pub fn assemble(store: &dyn SessionStore, policy: EnrollmentPolicy) -> FilterParams {
    let slot = |s: FilterSlot| {
        store
            .get_text(s.as_str())
            .unwrap_or_else(|| UNSET_VALUE.to_string())
    };
    FilterParams {
        language: slot(FilterSlot::Language),
        topic: slot(FilterSlot::Topic),
        level: slot(FilterSlot::Level),
        max_duration: slot(FilterSlot::MaxDuration),
        certificate: slot(FilterSlot::Certificate),
        enrollments: enrollment_codes(store.get(ENROLLMENTS_SLOT).as_ref(), policy),
    }
}

/// Course codes of the enrolled courses, in profile order.
pub fn enrollment_codes(enrollments: Option<&Value>, policy: EnrollmentPolicy) -> Vec<String> {
    let Some(Value::Array(entries)) = enrollments else {
        return Vec::new();
    };
    let mut skipped = 0usize;
    let codes: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            let code = course_code(entry);
            if code.is_none() && policy == EnrollmentPolicy::Skip {
                skipped += 1;
            }
            code.or_else(|| match policy {
                EnrollmentPolicy::PassThrough => Some(raw_id(entry)),
                EnrollmentPolicy::Skip => None,
            })
        })
        .collect();
    if skipped > 0 {
        tracing::debug!(
            target: "kic::actions",
            skipped,
            "Enrollments without course code left out"
        );
    }
    codes
}

fn course_code(entry: &Value) -> Option<String> {
    match entry {
        Value::String(code) if !code.trim().is_empty() => Some(code.trim().to_string()),
        Value::Object(fields) => fields
            .get("course_code")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn raw_id(entry: &Value) -> String {
    match entry.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(id) if !id.is_null() => id.to_string(),
        _ => match entry {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kic_core::MemorySessionStore;
    use serde_json::json;

    #[test]
    fn unset_slots_are_sent_as_none() {
        let store = MemorySessionStore::from_slots([
            ("language", json!("deutsch")),
            ("max_duration", json!(10)),
            ("topic", Value::Null),
        ]);
        let params = assemble(&store, EnrollmentPolicy::PassThrough);
        assert_eq!(params.language, "deutsch");
        assert_eq!(params.topic, "None");
        assert_eq!(params.level, "None");
        assert_eq!(params.max_duration, "10");
        assert!(params.enrollments.is_empty());
    }

    #[test]
    fn pass_through_keeps_entries_without_code() {
        let enrollments = json!([
            {"id": "c-1", "course_code": "ki-101"},
            {"id": "c-2", "course_code": ""},
            {"id": 17},
            {"title": "Ohne Kennung"}
        ]);
        let codes = enrollment_codes(Some(&enrollments), EnrollmentPolicy::PassThrough);
        assert_eq!(
            codes,
            vec!["ki-101", "c-2", "17", r#"{"title":"Ohne Kennung"}"#]
        );
    }

    #[test]
    fn skip_drops_entries_without_code() {
        let enrollments = json!([
            {"id": "c-1", "course_code": "ki-101"},
            {"id": "c-2"},
            "ki-202"
        ]);
        let codes = enrollment_codes(Some(&enrollments), EnrollmentPolicy::Skip);
        assert_eq!(codes, vec!["ki-101", "ki-202"]);
    }

    #[test]
    fn missing_or_non_list_enrollments_are_empty() {
        assert!(enrollment_codes(None, EnrollmentPolicy::PassThrough).is_empty());
        assert!(enrollment_codes(Some(&Value::Null), EnrollmentPolicy::PassThrough).is_empty());
    }
}
