//! Error types for the CRM client.

pub mod kind;

pub use kind::{ErrorCategory, ErrorKind};

use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for all client operations.
#[derive(Error, Debug)]
pub enum CrmError {
    /// The request was malformed; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Token acquisition failed: {0}")]
    TokenAcquisitionFailed(#[from] AuthError),

    /// Transport-level failure (connect, timeout, TLS, ...).
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {kind} (status {status}): {message}")]
    Api {
        kind: ErrorKind,
        status: u16,
        message: String,
        /// Page being fetched when a pagination cursor stopped.
        page: Option<u32>,
        body: Option<Value>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CrmError {
    /// Build an API error from a classified response.
    pub fn api(kind: ErrorKind, status: u16, body: Option<Value>) -> Self {
        Self::Api {
            kind,
            status,
            message: failure_message(status, body.as_ref()),
            page: None,
            body,
        }
    }

    /// Attach the page number that produced this error.
    pub fn at_page(self, page: u32) -> Self {
        match self {
            Self::Api {
                kind,
                status,
                message,
                body,
                ..
            } => Self::Api {
                kind,
                status,
                message,
                page: Some(page),
                body,
            },
            other => other,
        }
    }

    /// Kind of a classified API failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Api { page, .. } => *page,
            _ => None,
        }
    }

    /// True for a 429, or the API's 400 "too many requests" variant.
    pub fn is_too_many_requests(&self) -> bool {
        self.kind() == Some(ErrorKind::TooManyRequests)
    }

    /// Whether a later attempt might succeed. Advisory only: nothing in this
    /// crate retries API failures on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Api { kind, .. } => {
                *kind == ErrorKind::TooManyRequests || kind.category() == ErrorCategory::Server
            }
            _ => false,
        }
    }
}

fn failure_message(status: u16, body: Option<&Value>) -> String {
    let from_body = body.and_then(|b| {
        ["message", "error_description", "error", "code"]
            .iter()
            .find_map(|key| b.get(*key).and_then(Value::as_str))
    });
    match from_body {
        Some(text) => text.to_string(),
        None => reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("request failed")
            .to_string(),
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CrmError>;
