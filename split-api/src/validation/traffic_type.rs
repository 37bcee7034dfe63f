use super::ValidationError;
use super::key::validate_string;
use serde_json::Value;

const LABEL: &str = "trafficType";

/// Validates a traffic type and normalizes it to lower case.
pub fn validate_traffic_type(raw: Option<&str>) -> Result<String, ValidationError> {
    validate_string(raw, LABEL).map(|traffic_type| traffic_type.to_lowercase())
}

/// Same as [`validate_traffic_type`] for a value taken from a JSON document.
/// Only JSON strings are accepted.
pub fn validate_json_traffic_type(raw: Option<&Value>) -> Result<String, ValidationError> {
    match raw {
        None | Some(Value::Null) => validate_traffic_type(None),
        Some(Value::String(s)) => validate_traffic_type(Some(s)),
        Some(_) => Err(ValidationError::InvalidType(LABEL)),
    }
}
