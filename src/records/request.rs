use bon::Builder;
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::CrmError;

/// Columns the list and search endpoints can sort by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
pub enum SortBy {
    #[default]
    #[strum(serialize = "id")]
    Id,
    #[strum(serialize = "Created_Time")]
    CreatedTime,
    #[strum(serialize = "Modified_Time")]
    ModifiedTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// `GET /{module_name}`.
///
/// Without `per_page` every page is fetched until the server reports no
/// more records, which can cost many requests against the rate limit.
#[derive(Debug, Clone, Builder)]
pub struct ListRequest {
    #[builder(into)]
    pub module_name: String,
    /// Comma-separated field API names.
    #[builder(into)]
    pub fields: String,
    #[builder(default = 1)]
    pub page: u32,
    /// Total number of records to yield.
    pub per_page: Option<u32>,
    #[builder(default)]
    pub sort_by: SortBy,
    #[builder(default)]
    pub sort_order: SortOrder,
    #[builder(default)]
    pub strict: bool,
}

impl ListRequest {
    pub(crate) fn validate(&self) -> Result<(), CrmError> {
        require("module name", &self.module_name)?;
        require("fields", &self.fields)
    }
}

/// `GET /{module_name}/search`.
#[derive(Debug, Clone, Builder)]
pub struct SearchRequest {
    #[builder(into)]
    pub module_name: String,
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub phone: Option<String>,
    /// e.g. `Created_Time:between:2025-01-01T06:00:00+00:00,2025-01-30T06:00:00+00:00`
    #[builder(into)]
    pub criteria: Option<String>,
    #[builder(into)]
    pub word: Option<String>,
    #[builder(default = 1)]
    pub page: u32,
    pub per_page: Option<u32>,
    #[builder(default)]
    pub sort_by: SortBy,
    #[builder(default)]
    pub sort_order: SortOrder,
    #[builder(default)]
    pub strict: bool,
}

impl SearchRequest {
    pub(crate) fn validate(&self) -> Result<(), CrmError> {
        require("module name", &self.module_name)
    }

    /// Search terms that are set and not blank.
    pub(crate) fn terms(&self) -> Vec<(&'static str, &str)> {
        [
            ("email", &self.email),
            ("phone", &self.phone),
            ("criteria", &self.criteria),
            ("word", &self.word),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }
}

/// Records to write; a single object is sent as a one-element array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordData(Vec<Value>);

impl RecordData {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Array(self.0)
    }
}

impl From<Value> for RecordData {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self(items),
            Value::Null => Self(Vec::new()),
            other => Self(vec![other]),
        }
    }
}

impl From<Vec<Value>> for RecordData {
    fn from(items: Vec<Value>) -> Self {
        Self(items)
    }
}

/// `POST /{module_name}/upsert`.
#[derive(Debug, Clone, Builder)]
pub struct UpsertRequest {
    #[builder(into)]
    pub module_name: String,
    #[builder(into)]
    pub data: RecordData,
    #[builder(default)]
    pub duplicate_check_fields: Vec<String>,
    #[builder(default)]
    pub skip_feature_execution: Vec<Value>,
    #[builder(default)]
    pub trigger: Vec<String>,
}

impl UpsertRequest {
    pub(crate) fn validate(&self) -> Result<(), CrmError> {
        require("module name", &self.module_name)?;
        require_data(&self.data)
    }

    /// Request body; empty option lists are left out.
    pub(crate) fn body(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("data".to_string(), Value::Array(self.data.as_slice().to_vec()));
        if !self.duplicate_check_fields.is_empty() {
            body.insert(
                "duplicate_check_fields".to_string(),
                Value::from(self.duplicate_check_fields.clone()),
            );
        }
        if !self.skip_feature_execution.is_empty() {
            body.insert(
                "skip_feature_execution".to_string(),
                Value::Array(self.skip_feature_execution.clone()),
            );
        }
        if !self.trigger.is_empty() {
            body.insert("trigger".to_string(), Value::from(self.trigger.clone()));
        }
        Value::Object(body)
    }
}

pub(crate) fn require(name: &str, value: &str) -> Result<(), CrmError> {
    if value.trim().is_empty() {
        return Err(CrmError::Validation(format!("{name} can't be blank")));
    }
    Ok(())
}

pub(crate) fn require_data(data: &RecordData) -> Result<(), CrmError> {
    if data.is_empty() {
        return Err(CrmError::Validation("data can't be blank".to_string()));
    }
    Ok(())
}
