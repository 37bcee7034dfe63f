use crate::api::{ApiResponse, Endpoint, unauthorized_response};
use crate::auth::is_authorized;
use crate::errors::ApiError;
use crate::evaluator::Evaluator;
use crate::metrics_defs::{API_REQUEST_DURATION, API_REQUESTS, API_VALIDATION_REJECTED};
use crate::query::QueryParams;
use hyper::body::Incoming;
use hyper::service::Service;
use hyper::{Method, Request, StatusCode};
use shared::http::make_boxed_error_response;
use shared::{counter, histogram};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

struct Inner {
    auth_token: String,
    evaluator: Arc<dyn Evaluator>,
}

/// Hyper service answering the evaluation and manager endpoints.
#[derive(Clone)]
pub struct ApiService {
    inner: Arc<Inner>,
}

impl ApiService {
    pub fn new(auth_token: impl Into<String>, evaluator: Arc<dyn Evaluator>) -> Self {
        ApiService {
            inner: Arc::new(Inner {
                auth_token: auth_token.into(),
                evaluator,
            }),
        }
    }

    /// Authorizes, routes and answers a request. The request body is ignored.
    pub async fn handle<B>(&self, req: Request<B>) -> ApiResponse {
        let start = Instant::now();
        let (parts, _) = req.into_parts();

        // Authorization is checked before anything else, unknown paths included
        if !is_authorized(&parts.headers, &self.inner.auth_token) {
            tracing::debug!(path = %parts.uri.path(), "Unauthorized request");
            return unauthorized_response();
        }

        let Some(endpoint) = Endpoint::from_path(parts.uri.path()) else {
            tracing::debug!(path = %parts.uri.path(), "No endpoint matched");
            return make_boxed_error_response(StatusCode::NOT_FOUND);
        };

        if parts.method != Method::GET {
            return make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED);
        }

        let params = QueryParams::from_uri(&parts.uri);
        let response = match endpoint
            .handle(self.inner.evaluator.as_ref(), &params)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                if let ApiError::Rejected(rejection) = &err {
                    tracing::debug!(
                        endpoint = endpoint.as_str(),
                        errors = ?rejection.messages(),
                        "Request failed validation"
                    );
                    counter!(API_VALIDATION_REJECTED, "endpoint" => endpoint.as_str()).increment(1);
                }
                err.into_response()
            }
        };

        counter!(
            API_REQUESTS,
            "endpoint" => endpoint.as_str(),
            "status" => response.status().as_u16().to_string()
        )
        .increment(1);
        histogram!(API_REQUEST_DURATION, "endpoint" => endpoint.as_str())
            .record(start.elapsed().as_secs_f64());

        response
    }
}

impl Service<Request<Incoming>> for ApiService {
    type Response = ApiResponse;
    type Error = ApiError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}
