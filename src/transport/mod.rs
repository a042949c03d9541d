//! HTTP transport seam.
//!
//! The core talks to the network only through [`Transport`]. One transport is
//! bound to the accounts host (token exchange) and another to the CRM API
//! host; both are normally [`ReqwestTransport`]s.

pub mod http;

pub use http::ReqwestTransport;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;

use crate::error::CrmError;

/// Request payload encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Appended to the URL as a query string.
    Query(Vec<(String, String)>),
    Json(Value),
    /// `application/x-www-form-urlencoded` body.
    Form(Vec<(String, String)>),
}

/// A request relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// A response with its body decoded as JSON when present.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// `None` for an empty body; non-JSON text is kept as a JSON string.
    pub body: Option<Value>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CrmError>;
}
