//! Validation and normalization of untrusted query parameters.
//!
//! Every validator is a free function returning `Result<T, ValidationError>`;
//! the `Display` output of a [`ValidationError`] is the exact message sent back
//! to the caller. [`Validation`] collects failures across the parameters of a
//! single request so they can be reported together.

mod attributes;
mod key;
mod keys;
mod split;
mod traffic_type;
mod value;

pub use attributes::{Attributes, validate_attributes};
pub use key::{validate_json_key, validate_key, validate_string};
pub use keys::{KeyRecord, validate_keys};
pub use split::{validate_split_name, validate_split_names};
pub use traffic_type::{validate_json_traffic_type, validate_traffic_type};
pub use value::validate_value;

use serde::Serialize;
use thiserror::Error;

/// Maximum number of characters accepted for keys, traffic types and split names.
pub const MAX_LENGTH: usize = 250;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("you passed a null or undefined {0}, {0} must be a non-empty string.")]
    MissingField(&'static str),

    #[error("you passed an invalid {0}, {0} must be a non-empty string.")]
    InvalidType(&'static str),

    #[error("you passed an empty string, {0} must be a non-empty string.")]
    EmptyField(&'static str),

    #[error("{0} too long, {0} must be 250 characters or less.")]
    TooLong(&'static str),

    #[error("you passed null or undefined keys, keys must be a non-empty array.")]
    MissingKeys,

    #[error("keys must be a valid format.")]
    InvalidFormat,

    #[error("There should be at least one matchingKey-trafficType element.")]
    EmptyArray,

    #[error(
        "keys is array but there are errors inside of it. keys must be an array with at least one element that contain a valid matchingKey and trafficType. It can also includes bucketingKey."
    )]
    ElementInvalid,

    #[error("attributes must be a plain object.")]
    NotAnObject,

    #[error("value must be null or number.")]
    NotANumber,

    #[error("you passed a null or undefined split-names, split-names must be a non-empty array.")]
    MissingSplitNames,

    #[error("split-names must be a non-empty array.")]
    EmptySplitNames,
}

/// A request that failed validation, with one message per failing parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rejection {
    pub error: Vec<String>,
}

impl Rejection {
    pub fn messages(&self) -> &[String] {
        &self.error
    }
}

impl From<ValidationError> for Rejection {
    fn from(err: ValidationError) -> Self {
        Rejection {
            error: vec![err.to_string()],
        }
    }
}

/// Collects validation failures in the order the validators run.
///
/// ```ignore
/// let mut validation = Validation::default();
/// let keys = validation.check(validate_keys(params.get("keys")));
/// let attributes = validation.check(validate_attributes(params.get("attributes")));
/// let (keys, attributes) = validation.finish(keys.zip(attributes))?;
/// ```
#[derive(Debug, Default)]
pub struct Validation {
    errors: Vec<String>,
}

impl Validation {
    /// Records the failure of `result`, if any, and hands back the normalized value.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err.to_string());
                None
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Yields `values` when every check passed, otherwise the collected rejection.
    pub fn finish<T>(self, values: Option<T>) -> Result<T, Rejection> {
        match values {
            Some(values) if self.errors.is_empty() => Ok(values),
            _ => Err(Rejection {
                error: self.errors,
            }),
        }
    }
}
