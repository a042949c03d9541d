use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::CrmError;

/// The API never returns more than this many items per page.
pub const MAX_PER_PAGE: u32 = 100;

/// Turns one raw list item into a caller-facing value.
pub type Decoder<T> = Arc<dyn Fn(Value) -> Result<T, CrmError> + Send + Sync>;

/// Description of a paginated listing.
///
/// # Example
/// ```
/// use zoho_crm::pagination::PageRequest;
/// use zoho_crm::records::Record;
///
/// let request = PageRequest::new("Contacts", "data", Record::decode)
///     .limit(250)
///     .filter("fields", "Email,Last_Name");
/// assert_eq!(request.per_request(), 100);
/// ```
pub struct PageRequest<T> {
    pub(crate) path: String,
    pub(crate) list_key: String,
    pub(crate) decoder: Decoder<T>,
    pub(crate) page: u32,
    pub(crate) total: Option<u32>,
    pub(crate) filters: Map<String, Value>,
    pub(crate) strict: bool,
}

impl<T> PageRequest<T> {
    pub fn new<F>(path: impl Into<String>, list_key: impl Into<String>, decoder: F) -> Self
    where
        F: Fn(Value) -> Result<T, CrmError> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            list_key: list_key.into(),
            decoder: Arc::new(decoder),
            page: 1,
            total: None,
            filters: Map::new(),
            strict: false,
        }
    }

    /// First page to request (1-based).
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Stop after `total` items across all pages.
    pub fn limit(mut self, total: u32) -> Self {
        self.total = Some(total);
        self
    }

    /// `None` walks every page the server reports.
    pub fn with_total(mut self, total: Option<u32>) -> Self {
        self.total = total;
        self
    }

    /// Extra query parameter sent with every page request.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// In strict mode a failed page surfaces as an error item; otherwise the
    /// sequence just ends.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    pub fn starting_page(&self) -> u32 {
        self.page
    }

    pub fn total(&self) -> Option<u32> {
        self.total
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// `per_page` sent to the server: the bound capped at [`MAX_PER_PAGE`].
    pub fn per_request(&self) -> u32 {
        self.total.map_or(MAX_PER_PAGE, |t| t.min(MAX_PER_PAGE))
    }

    pub fn validate(&self) -> Result<(), CrmError> {
        if self.path.trim().is_empty() {
            return Err(CrmError::Validation("path can't be blank".to_string()));
        }
        if self.list_key.trim().is_empty() {
            return Err(CrmError::Validation("list key can't be blank".to_string()));
        }
        if self.page < 1 {
            return Err(CrmError::Validation(
                "page must be greater than or equal to 1".to_string(),
            ));
        }
        if self.total == Some(0) {
            return Err(CrmError::Validation(
                "per page must be greater than or equal to 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Query parameters for `page`.
    pub(crate) fn params(&self, page: u32) -> Value {
        let mut params = self.filters.clone();
        // Paging keys always win over filters of the same name.
        params.insert("page".to_string(), Value::from(page));
        params.insert("per_page".to_string(), Value::from(self.per_request()));
        Value::Object(params)
    }
}

impl<T> Clone for PageRequest<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            list_key: self.list_key.clone(),
            decoder: Arc::clone(&self.decoder),
            page: self.page,
            total: self.total,
            filters: self.filters.clone(),
            strict: self.strict,
        }
    }
}

impl<T> fmt::Debug for PageRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRequest")
            .field("path", &self.path)
            .field("list_key", &self.list_key)
            .field("page", &self.page)
            .field("total", &self.total)
            .field("filters", &self.filters)
            .field("strict", &self.strict)
            .finish()
    }
}
