use super::ValidationError;

/// Parses the optional numeric `value` of a tracked event.
pub fn validate_value(raw: Option<&str>) -> Result<Option<f64>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ValidationError::NotANumber),
    }
}
