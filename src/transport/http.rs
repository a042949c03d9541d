//! `reqwest`-backed [`Transport`] with retry and redacted logging.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use tracing::Level;

use super::{HttpRequest, HttpResponse, RequestBody, Transport};
use crate::config::LogOptions;
use crate::error::CrmError;
use crate::util::redact::{redact, redact_header};
use crate::util::retry::RetryPolicy;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const LOG_PREFIX: &str = "ZohoCrm";

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        if $level == Level::ERROR {
            tracing::error!($($arg)+)
        } else if $level == Level::WARN {
            tracing::warn!($($arg)+)
        } else if $level == Level::INFO {
            tracing::info!($($arg)+)
        } else if $level == Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

/// Transport bound to one base URL.
///
/// # Example
/// ```no_run
/// use zoho_crm::transport::ReqwestTransport;
///
/// let api = ReqwestTransport::new("https://www.zohoapis.com/crm/v7")?;
/// # Ok::<(), zoho_crm::error::CrmError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    log: LogOptions,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CrmError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CrmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry: RetryPolicy::default(),
            log: LogOptions::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_log_options(mut self, log: LogOptions) -> Self {
        self.log = log;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send_once(&self, url: &str, request: &HttpRequest) -> Result<HttpResponse, CrmError> {
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Query(pairs) => builder.query(pairs),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(pairs) => builder.form(pairs),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.text().await?;
        Ok(HttpResponse {
            status,
            headers,
            body: decode_body(&text),
        })
    }

    fn log_request(&self, url: &str, request: &HttpRequest) {
        let level = self.log.level;
        log_at!(level, method = %request.method, url = %url, "{LOG_PREFIX} request");
        if self.log.headers {
            log_at!(level, headers = %render_headers(&request.headers), "{LOG_PREFIX} request headers");
        }
        if self.log.bodies {
            if let Some(body) = render_body(&request.body) {
                log_at!(level, body = %body, "{LOG_PREFIX} request body");
            }
        }
    }

    fn log_response(&self, url: &str, response: &HttpResponse) {
        let level = self.log.level;
        log_at!(level, status = response.status, url = %url, "{LOG_PREFIX} response");
        if self.log.headers {
            log_at!(level, headers = %render_headers(&response.headers), "{LOG_PREFIX} response headers");
        }
        if self.log.bodies {
            if let Some(body) = &response.body {
                log_at!(level, body = %redact(&body.to_string()), "{LOG_PREFIX} response body");
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CrmError> {
        let url = self.url(&request.path);
        self.log_request(&url, &request);

        let retry = if is_idempotent(&request.method) {
            self.retry.clone()
        } else {
            RetryPolicy::none()
        };
        let response = retry.execute(|| self.send_once(&url, &request)).await?;

        self.log_response(&url, &response);
        Ok(response)
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

fn decode_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

fn render_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<binary>");
            format!("{}: {}", name, redact_header(name.as_str(), value))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_body(body: &RequestBody) -> Option<String> {
    let raw = match body {
        RequestBody::Empty => return None,
        RequestBody::Json(value) => value.to_string(),
        RequestBody::Query(pairs) | RequestBody::Form(pairs) => pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&"),
    };
    Some(redact(&raw))
}
