pub mod types;
pub mod auth;
pub mod client;

pub use types::*;
pub use auth::*;
pub use client::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::recovery::DecodingError;

/// Classified failure of one reasoning call.
#[derive(Error, Debug)]
pub enum ReasoningError {
    #[error("Authentication required: missing or expired credential")]
    AuthenticationRequired,

    #[error("Reasoning service rate limit exceeded")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Reasoning service returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Reasoning service returned no text content")]
    NoContent,

    #[error(transparent)]
    Decoding(#[from] DecodingError),

    #[error("Reasoning call cancelled")]
    Cancelled,

    #[error("Invalid reasoning service configuration: {0}")]
    Config(String),
}

impl ReasoningError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AuthenticationRequired => FailureKind::AuthenticationRequired,
            Self::RateLimited => FailureKind::RateLimited,
            Self::Network(_) => FailureKind::Network,
            Self::Http { .. } => FailureKind::Server,
            Self::NoContent => FailureKind::NoContent,
            Self::Decoding(_) => FailureKind::Decoding,
            Self::Cancelled => FailureKind::Cancelled,
            Self::Config(_) => FailureKind::Configuration,
        }
    }

    /// Message safe to show the user. Never includes response bodies verbatim
    /// except the service's own error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationRequired => {
                "Your session has expired. Please sign in again to continue.".into()
            }
            Self::RateLimited => "The service is busy. Please wait a moment and try again.".into(),
            Self::Network(cause) => {
                format!("Network error: {cause}. Please check your internet connection.")
            }
            Self::Http { status, body } => match extract_error_message(body) {
                Some(message) => format!("API error ({status}): {message}"),
                None => format!("Server returned an error (status {status}). Please try again."),
            },
            Self::NoContent => "The service returned an empty response. Please try again.".into(),
            Self::Decoding(_) => "Failed to process the response. Please try again.".into(),
            Self::Cancelled => "The request was cancelled.".into(),
            Self::Config(_) => {
                "The analysis service is not configured correctly. Please contact support.".into()
            }
        }
    }

    pub fn to_notice(&self) -> FailureNotice {
        FailureNotice {
            kind: self.kind(),
            message: self.user_message(),
        }
    }
}

/// Failure category exposed to the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    AuthenticationRequired,
    RateLimited,
    Network,
    Server,
    NoContent,
    Decoding,
    Cancelled,
    Configuration,
}

/// User-facing failure: a category plus a specific message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureNotice {
    pub kind: FailureKind,
    pub message: String,
}

// ═══════════════════════════════════════════════════════════
// Error envelopes
// ═══════════════════════════════════════════════════════════

type EnvelopeMatcher = fn(&Value) -> Option<String>;

/// Known error body shapes, probed in order.
const ERROR_ENVELOPES: &[EnvelopeMatcher] = &[nested_error_message, flat_error_message];

/// Pull the service's own message out of an error body, if one is recognisable.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ERROR_ENVELOPES.iter().find_map(|matcher| matcher(&value))
}

/// `{"error": {"message": "..."}}`
fn nested_error_message(value: &Value) -> Option<String> {
    non_blank(value.get("error")?.get("message")?.as_str()?)
}

/// `{"error": "..."}`
fn flat_error_message(value: &Value) -> Option<String> {
    non_blank(value.get("error")?.as_str()?)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
