//! Top-level shape check for status API responses.

use crate::error::{Result, WatchError};
use crate::homework::json_kind;
use serde_json::Value;

/// Key holding the homework list in the API payload.
pub const HOMEWORKS_KEY: &str = "homeworks";

/// Validate a raw API body and return its `homeworks` array unmodified.
///
/// Elements are not inspected here; see [`crate::homework::StatusRecord::from_value`].
///
/// # Errors
///
/// - [`WatchError::MalformedResponse`] if the body is not an object or
///   `homeworks` is not an array.
/// - [`WatchError::MissingField`] if `homeworks` is absent.
pub fn validate(raw: &Value) -> Result<&[Value]> {
    let Some(obj) = raw.as_object() else {
        return Err(WatchError::MalformedResponse(format!(
            "expected an object, got {}",
            json_kind(raw)
        )));
    };
    let Some(homeworks) = obj.get(HOMEWORKS_KEY) else {
        return Err(WatchError::MissingField(HOMEWORKS_KEY.to_owned()));
    };
    match homeworks {
        Value::Array(items) => Ok(items),
        other => Err(WatchError::MalformedResponse(format!(
            "`{HOMEWORKS_KEY}` is {}, expected an array",
            json_kind(other)
        ))),
    }
}
