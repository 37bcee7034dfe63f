use crate::evaluator::EvaluatorError;
use crate::validation::{Rejection, ValidationError};
use thiserror::Error;

/// Result type alias for split-api operations
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Errors that can occur while serving the split API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request rejected: {}", .0.messages().join(" "))]
    Rejected(Rejection),

    #[error("split {0} was not found.")]
    SplitNotFound(String),

    #[error("response serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        ApiError::Rejected(rejection)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Rejected(err.into())
    }
}
