use super::ValidationError;
use super::key::validate_string;

const SPLIT_NAME: &str = "split-name";

pub fn validate_split_name(raw: Option<&str>) -> Result<String, ValidationError> {
    validate_string(raw, SPLIT_NAME)
}

/// Validates the comma separated `split-names` parameter.
///
/// Blank entries are dropped and duplicates removed, keeping the first
/// occurrence. Any other invalid entry fails the whole list.
pub fn validate_split_names(raw: Option<&str>) -> Result<Vec<String>, ValidationError> {
    let Some(raw) = raw else {
        return Err(ValidationError::MissingSplitNames);
    };

    let mut names: Vec<String> = Vec::new();
    for item in raw.split(',') {
        match validate_split_name(Some(item)) {
            Ok(name) => {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            Err(ValidationError::EmptyField(_)) => continue,
            Err(err) => return Err(err),
        }
    }

    if names.is_empty() {
        return Err(ValidationError::EmptySplitNames);
    }

    Ok(names)
}
