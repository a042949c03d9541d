//! HTTP failure taxonomy for the CRM API.

use serde_json::Value;
use strum::{AsRefStr, Display};

/// Named kind of a failed API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    ProxyAuthenticationRequired,
    RequestTimeout,
    Conflict,
    Gone,
    PayloadTooLarge,
    UnsupportedMediaType,
    UnprocessableEntity,
    TooManyRequests,
    /// Any other 4xx.
    ClientError,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    /// Any other 5xx.
    ServerError,
    /// 2xx response whose body carries an `error` field.
    EmbeddedError,
}

/// Broad grouping of [`ErrorKind`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Server,
    Embedded,
}

const TOO_MANY_REQUESTS_PHRASE: &str = "too many requests";

impl ErrorKind {
    /// Map a non-success status code to its kind.
    ///
    /// Returns `None` for statuses outside 4xx/5xx.
    pub fn from_status(status: u16) -> Option<Self> {
        let kind = match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            406 => Self::NotAcceptable,
            407 => Self::ProxyAuthenticationRequired,
            408 => Self::RequestTimeout,
            409 => Self::Conflict,
            410 => Self::Gone,
            413 => Self::PayloadTooLarge,
            415 => Self::UnsupportedMediaType,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            400..=499 => Self::ClientError,
            500 => Self::InternalServerError,
            501 => Self::NotImplemented,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            500..=599 => Self::ServerError,
            _ => return None,
        };
        Some(kind)
    }

    /// Classify a response from its status and decoded body.
    ///
    /// The API reports throttling as a 400 whose `error_description`
    /// mentions "too many requests"; that case is folded into
    /// [`ErrorKind::TooManyRequests`]. A 2xx body with an `error` field is an
    /// [`ErrorKind::EmbeddedError`].
    pub fn classify(status: u16, body: Option<&Value>) -> Option<Self> {
        if (200..300).contains(&status) {
            return body
                .and_then(|b| b.get("error"))
                .map(|_| Self::EmbeddedError);
        }
        if status == 400 && mentions_too_many_requests(body) {
            return Some(Self::TooManyRequests);
        }
        Self::from_status(status)
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmbeddedError => ErrorCategory::Embedded,
            Self::InternalServerError
            | Self::NotImplemented
            | Self::BadGateway
            | Self::ServiceUnavailable
            | Self::GatewayTimeout
            | Self::ServerError => ErrorCategory::Server,
            _ => ErrorCategory::Client,
        }
    }
}

fn mentions_too_many_requests(body: Option<&Value>) -> bool {
    body.and_then(|b| b.get("error_description"))
        .and_then(Value::as_str)
        .map(|d| d.to_ascii_lowercase().contains(TOO_MANY_REQUESTS_PHRASE))
        .unwrap_or(false)
}
