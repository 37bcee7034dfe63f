use super::{MAX_LENGTH, ValidationError};
use serde_json::{Number, Value};
use std::borrow::Cow;

// Largest integer an IEEE-754 double holds exactly (2^53 - 1)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Validates a single free-form string field.
///
/// The value is trimmed (whitespace and byte order marks) before the
/// emptiness and length checks, and the trimmed value is what comes back on
/// success. Length is measured in UTF-16 code units.
pub fn validate_string(raw: Option<&str>, label: &'static str) -> Result<String, ValidationError> {
    let Some(raw) = raw else {
        return Err(ValidationError::MissingField(label));
    };

    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(label));
    }
    if trimmed.encode_utf16().count() > MAX_LENGTH {
        return Err(ValidationError::TooLong(label));
    }

    Ok(trimmed.to_string())
}

/// Validates a matching or bucketing key taken from a query parameter.
pub fn validate_key(raw: Option<&str>, label: &'static str) -> Result<String, ValidationError> {
    validate_string(raw, label)
}

/// Validates a matching or bucketing key taken from a parsed JSON document.
///
/// Numbers are accepted and converted to their decimal representation;
/// integral floats such as `1.0` or `1e3` render without a fraction.
/// `None` means the field was absent, `Some(Value::Null)` an explicit null;
/// both are reported as missing.
pub fn validate_json_key(raw: Option<&Value>, label: &'static str) -> Result<String, ValidationError> {
    let text = match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
        Some(Value::Number(n)) => Some(Cow::Owned(number_to_key(n))),
        Some(_) => return Err(ValidationError::InvalidType(label)),
    };

    validate_string(text.as_deref(), label)
}

fn number_to_key(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => (f as i64).to_string(),
        _ => n.to_string(),
    }
}
