//! Error types for the recommender actions.

use thiserror::Error;

/// Errors from the external recommender service.
#[derive(Error, Debug)]
pub enum RecommenderError {
    #[error("Recommender request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Recommender returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Recommender response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RecommenderError {
    /// HTTP status of a rejected call, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RecommenderError::Status { status, .. } => Some(*status),
            RecommenderError::Transport(err) => err.status().map(|s| s.as_u16()),
            RecommenderError::Decode(_) => None,
        }
    }
}

/// Errors while loading or resolving response texts.
#[derive(Error, Debug)]
pub enum ResponseTableError {
    #[error("Response file {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Response file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No responses configured for action '{0}'")]
    MissingAction(String),

    #[error("Action '{action}' is missing responses: {}", keys.join(", "))]
    MissingKeys { action: String, keys: Vec<String> },
}

/// Errors while decoding a button payload command.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Payload is empty")]
    Empty,

    #[error("Payload '{0}' is not a command (expected a leading '/')")]
    NotACommand(String),

    #[error("Payload '{0}' carries malformed entities")]
    MalformedEntities(String),

    #[error("Unsupported command '{0}'")]
    UnsupportedCommand(String),
}

/// Errors surfaced by action dispatch.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("No registered action found for name '{0}'.")]
    NotFound(String),

    #[error(transparent)]
    Responses(#[from] ResponseTableError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Session value could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}
