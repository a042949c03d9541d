//! Organization details (`GET /org`).

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::client::{RequestExecutor, ServiceResponse};
use crate::error::CrmError;
use crate::records::record::id_of;
use crate::records::Facade;

pub type OrganizationResponse = ServiceResponse<Organization>;

/// The CRM organization, taken from `org[0]` of the response.
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    id: Option<String>,
    attributes: Value,
}

impl Organization {
    pub fn from_body(body: &Value) -> Self {
        let first = body
            .get("org")
            .and_then(|org| org.get(0))
            .cloned()
            .unwrap_or(Value::Null);
        Self {
            id: id_of(&first),
            attributes: first,
        }
    }
}

impl Facade for Organization {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn attributes(&self) -> &Value {
        &self.attributes
    }
}

#[derive(Clone)]
pub struct Organizations {
    executor: Arc<RequestExecutor>,
}

impl Organizations {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn get(&self) -> Result<OrganizationResponse, CrmError> {
        let response = self.executor.execute(Method::GET, "org", None).await?;
        Ok(ServiceResponse::decode(response, Organization::from_body))
    }
}
