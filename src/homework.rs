//! Homework status records as seen on the wire and in the state store.

use crate::error::{Result, WatchError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One homework entry from the status API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    pub status: String,
    /// Human label (`homework_name` on the wire).
    pub name: String,
    /// Opaque `date_updated` value; never compared.
    pub updated_at: String,
}

impl StatusRecord {
    /// Build a record from one element of the `homeworks` array.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::MissingField`] when `id`, `status` or
    /// `homework_name` is absent, and [`WatchError::MalformedResponse`] when
    /// the element is not an object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            WatchError::MalformedResponse(format!("homework entry is {}", json_kind(value)))
        })?;

        let id = match obj.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(WatchError::MalformedResponse(format!(
                    "homework id is {}",
                    json_kind(other)
                )));
            }
            None => return Err(WatchError::MissingField("id".to_owned())),
        };

        Ok(Self {
            id,
            status: required_str(obj, "status")?,
            name: required_str(obj, "homework_name")?,
            updated_at: obj
                .get("date_updated")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        })
    }

    /// Snapshot to persist once this record has been accepted.
    #[must_use]
    pub fn snapshot(&self) -> StoredSnapshot {
        StoredSnapshot {
            id: self.id.clone(),
            status: self.status.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Persisted last-seen state of one homework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub id: String,
    pub status: String,
    pub updated_at: String,
}

fn required_str(obj: &serde_json::Map<String, Value>, key: &str) -> Result<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(WatchError::MalformedResponse(format!(
            "`{key}` is {}",
            json_kind(other)
        ))),
        None => Err(WatchError::MissingField(key.to_owned())),
    }
}

/// Short type name of a JSON value, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
