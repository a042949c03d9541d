use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

use super::response::ApiResponse;
use crate::auth::{AuthError, TokenManager};
use crate::error::CrmError;
use crate::transport::{HttpRequest, RequestBody, Transport};

/// Authorization scheme the CRM API expects in front of the access token.
pub const AUTH_SCHEME: &str = "Zoho-oauthtoken";

/// Issues one authenticated call against the CRM API.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenManager>,
}

impl RequestExecutor {
    /// `transport` must be bound to the CRM API host.
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<TokenManager>) -> Self {
        Self { transport, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Send `method path` with `params` as a JSON body (POST/PUT/PATCH) or a
    /// query string (everything else).
    ///
    /// HTTP failures are not errors here: they come back classified in
    /// [`ApiResponse::failure`]. Use [`ApiResponse::error_for_status`] to
    /// raise them. Token and transport failures are returned as `Err`.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        params: Option<Value>,
    ) -> Result<ApiResponse, CrmError> {
        let token = self.tokens.get_valid_token().await?;
        let mut authorization = HeaderValue::from_str(&format!("{AUTH_SCHEME} {token}"))
            .map_err(|_| {
                AuthError::InvalidResponse("access token is not a valid header value".to_string())
            })?;
        authorization.set_sensitive(true);

        let body = encode_params(&method, params)?;
        let request = HttpRequest::new(method, path)
            .with_header(AUTHORIZATION, authorization)
            .with_body(body);
        let response = self.transport.send(request).await?;
        Ok(ApiResponse::from(response))
    }
}

fn encode_params(method: &Method, params: Option<Value>) -> Result<RequestBody, CrmError> {
    let Some(params) = params else {
        return Ok(RequestBody::Empty);
    };
    if matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
        return Ok(RequestBody::Json(params));
    }
    Ok(RequestBody::Query(query_pairs(&params)?))
}

/// Flatten a JSON object into query pairs. Nulls are skipped; arrays become
/// comma-separated lists.
pub fn query_pairs(params: &Value) -> Result<Vec<(String, String)>, CrmError> {
    let Value::Object(map) = params else {
        return Err(CrmError::Validation(
            "query parameters must be a JSON object".to_string(),
        ));
    };
    Ok(map
        .iter()
        .filter_map(|(key, value)| query_value(value).map(|v| (key.clone(), v)))
        .collect())
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}
