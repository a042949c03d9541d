use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use super::error::AuthError;
use super::token::{AccessToken, Credentials};
use crate::transport::{HttpRequest, RequestBody, Transport};

pub const TOKEN_PATH: &str = "oauth/v2/token";
const GRANT_TYPE: &str = "refresh_token";

/// Mints access tokens. Stateless beyond its credentials.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch(&self) -> Result<AccessToken, AuthError>;
}

/// Refresh-token grant against the accounts server.
///
/// The accounts server answers failures with HTTP 200 and an `error` field;
/// such a body is a [`AuthError::Rejected`], not a token.
pub struct RefreshTokenProvider {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
}

impl RefreshTokenProvider {
    /// `transport` must be bound to the accounts host.
    pub fn new(transport: Arc<dyn Transport>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    fn form(&self) -> Vec<(String, String)> {
        vec![
            ("client_id".to_string(), self.credentials.client_id.clone()),
            (
                "client_secret".to_string(),
                self.credentials.client_secret.clone(),
            ),
            (
                "refresh_token".to_string(),
                self.credentials.refresh_token.clone(),
            ),
            ("grant_type".to_string(), GRANT_TYPE.to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<Value>,
}

#[async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn fetch(&self) -> Result<AccessToken, AuthError> {
        let request = HttpRequest::new(Method::POST, TOKEN_PATH)
            .with_header(ACCEPT, HeaderValue::from_static("application/json"))
            .with_body(RequestBody::Form(self.form()));
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !(200..300).contains(&response.status) {
            return Err(AuthError::InvalidResponse(format!(
                "Token request failed with status {}",
                response.status
            )));
        }
        let body = response.body.ok_or_else(|| {
            AuthError::InvalidResponse("Token response has no body".to_string())
        })?;
        parse_token_response(body)
    }
}

fn parse_token_response(body: Value) -> Result<AccessToken, AuthError> {
    let payload: TokenResponse = serde_json::from_value(body)?;
    if let Some(error) = payload.error {
        let reason = match error {
            Value::String(s) => s,
            other => other.to_string(),
        };
        return Err(AuthError::Rejected(reason));
    }
    let access_token = payload
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidResponse("Token response missing access_token".to_string()))?;
    let expires_in = payload
        .expires_in
        .ok_or_else(|| AuthError::InvalidResponse("Token response missing expires_in".to_string()))?;
    Ok(AccessToken {
        access_token,
        expires_in,
    })
}
