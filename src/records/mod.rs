//! Record CRUD, listing and search.

pub mod record;
pub mod request;

pub use record::{Facade, Record};
pub use request::{ListRequest, RecordData, SearchRequest, SortBy, SortOrder, UpsertRequest};

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use crate::client::{RequestExecutor, ServiceResponse};
use crate::error::{CrmError, ErrorKind};
use crate::pagination::{PageRequest, RecordCursor};
use request::{require, require_data};

pub type RecordResponse = ServiceResponse<Record>;

const LIST_KEY: &str = "data";

/// Record operations on any module (`Contacts`, `Leads`, `Deals`, ...).
#[derive(Clone)]
pub struct Records {
    executor: Arc<RequestExecutor>,
}

impl Records {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// `GET /{module_name}/{id}`. An empty 204 answer counts as not found.
    pub async fn get(&self, module_name: &str, id: &str) -> Result<RecordResponse, CrmError> {
        require("module name", module_name)?;
        require("id", id)?;
        let mut response = self
            .executor
            .execute(Method::GET, &format!("{module_name}/{id}"), None)
            .await?;
        if response.status() == 204 {
            response = response.with_failure(ErrorKind::NotFound);
        }
        Ok(ServiceResponse::decode(response, Record::from_body))
    }

    /// `POST /{module_name}`.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example(client: zoho_crm::CrmClient) -> zoho_crm::error::Result<()> {
    /// use serde_json::json;
    ///
    /// let created = client
    ///     .records()
    ///     .create(
    ///         "Contacts",
    ///         json!({"Email": "eric.cartman@example.com", "First_Name": "Eric", "Last_Name": "Cartman"}),
    ///     )
    ///     .await?
    ///     .error_for_status()?;
    /// println!("{:?}", created.id());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(
        &self,
        module_name: &str,
        data: impl Into<RecordData>,
    ) -> Result<RecordResponse, CrmError> {
        self.write(Method::POST, module_name, data.into()).await
    }

    /// `PUT /{module_name}`. Each entry must carry its `id`.
    pub async fn update(
        &self,
        module_name: &str,
        data: impl Into<RecordData>,
    ) -> Result<RecordResponse, CrmError> {
        self.write(Method::PUT, module_name, data.into()).await
    }

    /// `POST /{module_name}/upsert`.
    pub async fn upsert(&self, request: UpsertRequest) -> Result<RecordResponse, CrmError> {
        request.validate()?;
        let response = self
            .executor
            .execute(
                Method::POST,
                &format!("{}/upsert", request.module_name),
                Some(request.body()),
            )
            .await?;
        Ok(ServiceResponse::decode(response, Record::from_body))
    }

    /// `DELETE /{module_name}/{id}`.
    pub async fn delete(&self, module_name: &str, id: &str) -> Result<RecordResponse, CrmError> {
        require("module name", module_name)?;
        require("id", id)?;
        let response = self
            .executor
            .execute(Method::DELETE, &format!("{module_name}/{id}"), None)
            .await?;
        Ok(ServiceResponse::decode(response, Record::from_body))
    }

    /// Cursor over `GET /{module_name}`.
    pub fn list(&self, request: ListRequest) -> Result<RecordCursor<Record>, CrmError> {
        request.validate()?;
        let page_request = PageRequest::new(request.module_name.as_str(), LIST_KEY, Record::decode)
            .page(request.page)
            .with_total(request.per_page)
            .strict(request.strict)
            .filter("sort_by", request.sort_by.to_string())
            .filter("sort_order", request.sort_order.to_string())
            .filter("fields", request.fields);
        RecordCursor::new(Arc::clone(&self.executor), page_request)
    }

    /// Cursor over `GET /{module_name}/search`.
    pub fn search(&self, request: SearchRequest) -> Result<RecordCursor<Record>, CrmError> {
        request.validate()?;
        let mut page_request = PageRequest::new(
            format!("{}/search", request.module_name),
            LIST_KEY,
            Record::decode,
        )
        .page(request.page)
        .with_total(request.per_page)
        .strict(request.strict)
        .filter("sort_by", request.sort_by.to_string())
        .filter("sort_order", request.sort_order.to_string());
        for (key, value) in request.terms() {
            page_request = page_request.filter(key, value);
        }
        RecordCursor::new(Arc::clone(&self.executor), page_request)
    }

    async fn write(
        &self,
        method: Method,
        module_name: &str,
        data: RecordData,
    ) -> Result<RecordResponse, CrmError> {
        require("module name", module_name)?;
        require_data(&data)?;
        let response = self
            .executor
            .execute(method, module_name, Some(json!({ "data": data.into_value() })))
            .await?;
        Ok(ServiceResponse::decode(response, Record::from_body))
    }
}
