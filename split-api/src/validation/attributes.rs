use super::ValidationError;
use serde_json::{Map, Value};

/// Attributes forwarded to the evaluator alongside a key.
pub type Attributes = Map<String, Value>;

/// Parses the optional `attributes` parameter, which must hold a JSON object.
/// Only an absent parameter means "no attributes"; a literal `null` is rejected.
pub fn validate_attributes(raw: Option<&str>) -> Result<Option<Attributes>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(attributes)) => Ok(Some(attributes)),
        _ => Err(ValidationError::NotAnObject),
    }
}
