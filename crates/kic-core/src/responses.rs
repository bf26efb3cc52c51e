//! Localized response texts, one table per action, loaded from TOML.
//!
//! Each action resolves its table once at construction and fails fast if a message it
//! uses is missing. Templates use positional placeholders `{0}`, `{1}`, ...

use crate::error::ResponseTableError;
use std::collections::HashMap;
use std::fmt::{Display, Write};
use std::path::Path;

/// Response texts shipped with the repository (`config/responses.toml`).
pub const BUNDLED_RESPONSES: &str = include_str!("../../../config/responses.toml");

/// All response texts, keyed by action name and message id.
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    actions: HashMap<String, HashMap<String, String>>,
}

impl ResponseTable {
    pub fn from_toml_str(content: &str) -> Result<Self, ResponseTableError> {
        let actions: HashMap<String, HashMap<String, String>> = toml::from_str(content)?;
        Ok(Self { actions })
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ResponseTableError> {
        let content = std::fs::read_to_string(path).map_err(|source| ResponseTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn bundled() -> Result<Self, ResponseTableError> {
        Self::from_toml_str(BUNDLED_RESPONSES)
    }

    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Texts for `action`; errors unless every id in `required` is present.
    pub fn for_action(
        &self,
        action: &str,
        required: &[&str],
    ) -> Result<ActionResponses, ResponseTableError> {
        let texts = self
            .actions
            .get(action)
            .ok_or_else(|| ResponseTableError::MissingAction(action.to_string()))?;
        let missing: Vec<String> = required
            .iter()
            .filter(|key| !texts.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ResponseTableError::MissingKeys {
                action: action.to_string(),
                keys: missing,
            });
        }
        Ok(ActionResponses {
            action: action.to_string(),
            texts: texts.clone(),
        })
    }
}

/// Response texts of one action.
#[derive(Debug, Clone)]
pub struct ActionResponses {
    action: String,
    texts: HashMap<String, String>,
}

impl ActionResponses {
    /// Raw template for `key`. Unknown ids render as the id itself.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        match self.texts.get(key) {
            Some(text) => text.as_str(),
            None => {
                tracing::warn!(
                    target: "kic::responses",
                    action = %self.action,
                    key,
                    "Missing response text"
                );
                key
            }
        }
    }

    /// Template for `key` with `{i}` replaced by `args[i]`.
    pub fn format(&self, key: &str, args: &[&dyn Display]) -> String {
        format_template(self.text(key), args)
    }
}

/// Replaces positional placeholders `{0}`, `{1}`, ... in `template` in a single pass.
///
/// Substituted text is never scanned again, so braces inside an argument survive verbatim.
/// Placeholders without a matching argument are copied as they are.
pub fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after.find('}').and_then(|close| {
            let index = &after[..close];
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let arg = args.get(index.parse::<usize>().ok()?)?;
            Some((close, arg))
        });
        match placeholder {
            Some((close, arg)) => {
                let _ = write!(out, "{}", arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[action_demo]
hello = "Hallo {0}, du hast {1} Kurse."
bye = "Tschüss"
"#;

    #[test]
    fn resolves_action_table() {
        let table = ResponseTable::from_toml_str(SAMPLE).unwrap();
        let demo = table.for_action("action_demo", &["hello", "bye"]).unwrap();
        assert_eq!(demo.format("hello", &[&"Ada", &3]), "Hallo Ada, du hast 3 Kurse.");
        assert_eq!(demo.text("bye"), "Tschüss");
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        assert_eq!(
            format_template("{0} ({1})", &[&"Mengen {1} und Logik", &"ki-101"]),
            "Mengen {1} und Logik (ki-101)"
        );
        assert_eq!(format_template("{0}{0}", &[&"{0}"]), "{0}{0}");
    }

    #[test]
    fn unmatched_braces_are_kept() {
        assert_eq!(format_template("{2} {x} {} {", &[&"a"]), "{2} {x} {} {");
        assert_eq!(format_template("Noch {0} Kurse", &[&4]), "Noch 4 Kurse");
    }

    #[test]
    fn reports_missing_keys_and_actions() {
        let table = ResponseTable::from_toml_str(SAMPLE).unwrap();
        match table.for_action("action_demo", &["hello", "nope"]) {
            Err(ResponseTableError::MissingKeys { keys, .. }) => assert_eq!(keys, vec!["nope"]),
            other => panic!("expected MissingKeys, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            table.for_action("action_other", &[]),
            Err(ResponseTableError::MissingAction(_))
        ));
    }

    #[test]
    fn bundled_table_parses() {
        let table = ResponseTable::bundled().unwrap();
        assert!(table
            .action_names()
            .contains(&"action_get_learning_recommendation".to_string()));
    }
}
