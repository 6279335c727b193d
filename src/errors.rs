//! Typed error hierarchy for the Kasi Manager core.
//!
//! Three top-level enums cover the three layers a user action crosses:
//! - `ApiError` - transport, HTTP status and decoding failures from the REST API
//! - `FormError` - rejected field edits on a draft (bad path, wrong value type)
//! - `SubmitError` - the outcome of a gated form submission

use thiserror::Error;

use crate::form::ValidationErrors;

/// Message shown when the server rejects a request without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "The server rejected the request. Please try again.";

/// Errors surfaced by the Resource Client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Http {
        status: u16,
        message: Option<String>,
    },

    #[error("Failed to parse {context} response: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// HTTP status carried by the error, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Unauthenticated(_) => Some(401),
            _ => None,
        }
    }

    /// Whether a manual retry of the same action can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Display-ready text for the banner or inline error slot.
    ///
    /// Server-provided messages are shown verbatim; everything else gets a
    /// fixed fallback so raw transport errors never reach the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Unable to reach the server. Check your connection and retry.".to_string()
            }
            ApiError::NotFound { resource, .. } => format!("{} not found.", resource),
            ApiError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Http { message: None, .. } => GENERIC_FAILURE_MESSAGE.to_string(),
            ApiError::Parse { .. } => {
                "The server sent a response that could not be read.".to_string()
            }
            ApiError::Unauthenticated(reason) => reason.clone(),
            ApiError::BadRequest(reason) => reason.clone(),
        }
    }
}

/// Errors from editing a draft field by path.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field path '{0}' is nested deeper than one level")]
    PathTooDeep(String),

    #[error("Field path '{0}' is empty or malformed")]
    MalformedPath(String),

    #[error("Field '{path}' expects {expected}")]
    TypeMismatch { path: String, expected: &'static str },
}

/// Outcome of a failed form submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    Busy,

    #[error("Form has {} invalid field(s)", .0.len())]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}
