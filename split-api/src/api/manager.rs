use super::{ApiResponse, ok_json};
use crate::errors::{ApiError, Result};
use crate::evaluator::{Evaluator, SplitView};
use crate::query::QueryParams;
use crate::validation::validate_split_name;
use serde::Serialize;

#[derive(Serialize)]
struct SplitsResponse<T> {
    splits: Vec<T>,
}

/// `GET /names`
pub async fn names(evaluator: &dyn Evaluator) -> Result<ApiResponse> {
    ok_json(&SplitsResponse {
        splits: evaluator.split_names().await,
    })
}

/// `GET /split?split-name=`
pub async fn split(evaluator: &dyn Evaluator, params: &QueryParams) -> Result<ApiResponse> {
    let split_name = validate_split_name(params.get("split-name"))?;

    match evaluator.split(&split_name).await {
        Some(view) => ok_json(&view),
        None => Err(ApiError::SplitNotFound(split_name)),
    }
}

/// `GET /splits`
pub async fn splits(evaluator: &dyn Evaluator) -> Result<ApiResponse> {
    let splits: Vec<SplitView> = evaluator.splits().await;
    ok_json(&SplitsResponse { splits })
}
