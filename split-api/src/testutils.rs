use crate::api::ApiResponse;
use crate::evaluator::LocalhostEvaluator;
use crate::service::ApiService;
use http_body_util::BodyExt;
use hyper::Request;
use hyper::header::AUTHORIZATION;
use std::sync::Arc;
use url::form_urlencoded;

pub const TEST_AUTH_TOKEN: &str = "test";

pub const SPLITS_YAML: &str = r#"
- my-experiment:
    treatment: "on"
    keys: "test"
    config: "{\"desc\" : \"this applies only to ON treatment\"}"
- other-experiment-3:
    treatment: "off"
- other-experiment:
    treatment: "on"
    keys: ["only-this-key"]
- other-experiment-2:
    treatment: "on"
"#;

pub fn test_service() -> ApiService {
    let evaluator = LocalhostEvaluator::from_yaml(SPLITS_YAML).expect("parse test splits");
    ApiService::new(TEST_AUTH_TOKEN, Arc::new(evaluator))
}

/// Builds a request target with percent-encoded query parameters.
pub fn uri(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}

pub fn get(uri: &str, auth: Option<&str>) -> Request<()> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    builder.body(()).expect("build request")
}

pub async fn body_json(response: ApiResponse) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}
