use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::{CrmError, ErrorKind};
use crate::records::Facade;
use crate::transport::HttpResponse;

/// A CRM API response with its failure classification.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    headers: HeaderMap,
    body: Option<Value>,
    failure: Option<ErrorKind>,
}

impl From<HttpResponse> for ApiResponse {
    fn from(response: HttpResponse) -> Self {
        let failure = ErrorKind::classify(response.status, response.body.as_ref());
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
            failure,
        }
    }
}

impl ApiResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Value> {
        self.body
    }

    /// Failure classification, `None` on success.
    pub fn failure(&self) -> Option<ErrorKind> {
        self.failure
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Override the classification for endpoint-specific statuses.
    pub fn with_failure(mut self, kind: ErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    /// The failure as an error, if any.
    pub fn error(&self) -> Option<CrmError> {
        self.failure
            .map(|kind| CrmError::api(kind, self.status, self.body.clone()))
    }

    /// Turn a classified failure into `Err`.
    pub fn error_for_status(self) -> Result<Self, CrmError> {
        match self.failure {
            Some(kind) => Err(CrmError::api(kind, self.status, self.body)),
            None => Ok(self),
        }
    }
}

/// Outcome of a single-entity call: the raw response plus the entity decoded
/// from its body.
///
/// A failed call is still an `Ok` value; check [`is_success`](Self::is_success)
/// or convert with [`error_for_status`](Self::error_for_status).
#[derive(Debug, Clone)]
pub struct ServiceResponse<T> {
    response: ApiResponse,
    facade: Option<T>,
}

impl<T: Facade> ServiceResponse<T> {
    /// Decode the facade from the body when there is one.
    pub(crate) fn decode(response: ApiResponse, decode: impl FnOnce(&Value) -> T) -> Self {
        let facade = response.body().map(decode);
        Self { response, facade }
    }

    pub fn response(&self) -> &ApiResponse {
        &self.response
    }

    pub fn status(&self) -> u16 {
        self.response.status()
    }

    pub fn is_success(&self) -> bool {
        self.response.is_success()
    }

    pub fn failure(&self) -> Option<ErrorKind> {
        self.response.failure()
    }

    /// Raw response body.
    pub fn body(&self) -> Option<&Value> {
        self.response.body()
    }

    pub fn facade(&self) -> Option<&T> {
        self.facade.as_ref()
    }

    pub fn into_facade(self) -> Option<T> {
        self.facade
    }

    pub fn id(&self) -> Option<&str> {
        self.facade.as_ref().and_then(Facade::id)
    }

    pub fn attributes(&self) -> Option<&Value> {
        self.facade.as_ref().map(Facade::attributes)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.facade.as_ref().and_then(|f| f.get(field))
    }

    pub fn error_for_status(self) -> Result<Self, CrmError> {
        if let Some(err) = self.response.error() {
            return Err(err);
        }
        Ok(self)
    }
}
