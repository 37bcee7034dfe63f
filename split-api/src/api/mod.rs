//! Endpoint handlers.
//!
//! Each handler validates its query parameters, calls the evaluator and
//! serializes the outcome. Validation failures surface as
//! [`ApiError::Rejected`] and are rendered as `400 {"error": [...]}`.

pub mod client;
pub mod manager;

use crate::errors::{ApiError, Result};
use crate::evaluator::Evaluator;
use crate::query::QueryParams;
use crate::validation::Rejection;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use shared::http::{make_boxed_error_response, make_json_response};

pub type ApiBody = BoxBody<Bytes, ApiError>;
pub type ApiResponse = Response<ApiBody>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    GetTreatment,
    GetTreatmentWithConfig,
    GetTreatments,
    GetTreatmentsWithConfig,
    GetAllTreatments,
    GetAllTreatmentsWithConfig,
    Track,
    Names,
    Split,
    Splits,
}

impl Endpoint {
    pub fn from_path(path: &str) -> Option<Self> {
        let endpoint = match path.trim_end_matches('/') {
            "/get-treatment" => Endpoint::GetTreatment,
            "/get-treatment-with-config" => Endpoint::GetTreatmentWithConfig,
            "/get-treatments" => Endpoint::GetTreatments,
            "/get-treatments-with-config" => Endpoint::GetTreatmentsWithConfig,
            "/get-all-treatments" => Endpoint::GetAllTreatments,
            "/get-all-treatments-with-config" => Endpoint::GetAllTreatmentsWithConfig,
            "/track" => Endpoint::Track,
            "/names" => Endpoint::Names,
            "/split" => Endpoint::Split,
            "/splits" => Endpoint::Splits,
            _ => return None,
        };
        Some(endpoint)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Endpoint::GetTreatment => "get_treatment",
            Endpoint::GetTreatmentWithConfig => "get_treatment_with_config",
            Endpoint::GetTreatments => "get_treatments",
            Endpoint::GetTreatmentsWithConfig => "get_treatments_with_config",
            Endpoint::GetAllTreatments => "get_all_treatments",
            Endpoint::GetAllTreatmentsWithConfig => "get_all_treatments_with_config",
            Endpoint::Track => "track",
            Endpoint::Names => "names",
            Endpoint::Split => "split",
            Endpoint::Splits => "splits",
        }
    }

    pub async fn handle(self, evaluator: &dyn Evaluator, params: &QueryParams) -> Result<ApiResponse> {
        match self {
            Endpoint::GetTreatment => client::get_treatment(evaluator, params, false).await,
            Endpoint::GetTreatmentWithConfig => client::get_treatment(evaluator, params, true).await,
            Endpoint::GetTreatments => client::get_treatments(evaluator, params, false).await,
            Endpoint::GetTreatmentsWithConfig => {
                client::get_treatments(evaluator, params, true).await
            }
            Endpoint::GetAllTreatments => client::get_all_treatments(evaluator, params, false).await,
            Endpoint::GetAllTreatmentsWithConfig => {
                client::get_all_treatments(evaluator, params, true).await
            }
            Endpoint::Track => client::track(evaluator, params).await,
            Endpoint::Names => manager::names(evaluator).await,
            Endpoint::Split => manager::split(evaluator, params).await,
            Endpoint::Splits => manager::splits(evaluator).await,
        }
    }
}

pub(crate) fn ok_json<T: Serialize + ?Sized>(value: &T) -> Result<ApiResponse> {
    Ok(make_json_response(StatusCode::OK, value)?)
}

#[derive(Serialize)]
struct Unauthorized {
    error: &'static str,
}

pub fn unauthorized_response() -> ApiResponse {
    make_json_response(StatusCode::UNAUTHORIZED, &Unauthorized { error: "Unauthorized" })
        .unwrap_or_else(|_| make_boxed_error_response(StatusCode::UNAUTHORIZED))
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::SplitNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Serialization(_) | ApiError::Evaluator(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn into_response(self) -> ApiResponse {
        let status = self.status();
        let message = self.to_string();
        let rendered = match self {
            ApiError::Rejected(rejection) => make_json_response(status, &rejection),
            ApiError::SplitNotFound(_) => {
                make_json_response(status, &Rejection {
                    error: vec![message],
                })
            }
            err => {
                tracing::error!(error = %err, "Failed to handle request");
                return make_boxed_error_response(status);
            }
        };

        rendered.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize error response");
            make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
    }
}
