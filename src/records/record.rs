use serde_json::Value;

use crate::error::CrmError;

/// Decoded entity exposing an identifier and its raw attributes.
pub trait Facade {
    fn id(&self) -> Option<&str>;
    fn attributes(&self) -> &Value;

    fn get(&self, field: &str) -> Option<&Value> {
        self.attributes().get(field)
    }
}

/// A CRM record.
///
/// Built either from a whole response body or from a single list item:
/// when the value wraps records under `data`, the first entry is the record
/// and its id is `data[0].id`, or `data[0].details.id` for write responses;
/// otherwise the value itself is the record and its id is the top-level `id`.
///
/// # Example
/// ```
/// use serde_json::json;
/// use zoho_crm::records::{Facade, Record};
///
/// let record = Record::from_body(&json!({"data": [{"details": {"id": "7"}, "status": "success"}]}));
/// assert_eq!(record.id(), Some("7"));
/// assert_eq!(record.get("status"), Some(&json!("success")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: Option<String>,
    attributes: Value,
}

impl Record {
    pub fn from_body(body: &Value) -> Self {
        match body.get("data") {
            Some(data) => {
                let first = data.get(0).cloned().unwrap_or(Value::Null);
                let id = id_of(&first).or_else(|| first.get("details").and_then(id_of));
                Self {
                    id,
                    attributes: first,
                }
            }
            None => Self {
                id: id_of(body),
                attributes: body.clone(),
            },
        }
    }

    /// Decoder for list and search items.
    pub fn decode(item: Value) -> Result<Self, CrmError> {
        if !item.is_object() {
            return Err(CrmError::Decode(format!("expected a record object, got {item}")));
        }
        Ok(Self::from_body(&item))
    }

    pub fn into_attributes(self) -> Value {
        self.attributes
    }
}

impl Facade for Record {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn attributes(&self) -> &Value {
        &self.attributes
    }
}

/// Record ids are strings on the wire, but accept numbers too.
pub(crate) fn id_of(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
