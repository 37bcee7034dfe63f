//! The evaluation engine the API delegates to once a request is validated.

mod localhost;

pub use localhost::LocalhostEvaluator;

use crate::config::EvaluatorConfig;
use crate::validation::{Attributes, KeyRecord};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Treatment returned for splits that do not exist or cannot be evaluated.
pub const CONTROL: &str = "control";

#[derive(thiserror::Error, Debug)]
pub enum EvaluatorError {
    #[error("could not read split definitions: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse split definitions: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid split definition on line {line}: {content}")]
    InvalidLine { line: usize, content: String },
}

/// Identity a treatment is computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub matching_key: String,
    pub bucketing_key: Option<String>,
}

impl Key {
    pub fn new(matching_key: impl Into<String>, bucketing_key: Option<String>) -> Self {
        Key {
            matching_key: matching_key.into(),
            bucketing_key,
        }
    }
}

impl From<&KeyRecord> for Key {
    fn from(record: &KeyRecord) -> Self {
        Key {
            matching_key: record.matching_key.clone(),
            bucketing_key: record.bucketing_key.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Treatment {
    pub treatment: String,
    pub config: Option<String>,
}

impl Treatment {
    pub fn control() -> Self {
        Treatment {
            treatment: CONTROL.to_string(),
            config: None,
        }
    }
}

/// Description of a split as exposed by the manager endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitView {
    pub name: String,
    pub traffic_type: String,
    pub killed: bool,
    pub treatments: Vec<String>,
    pub change_number: i64,
    pub configs: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub key: String,
    pub traffic_type: String,
    pub event_type: String,
    pub value: Option<f64>,
}

#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Computes the treatment of `split_name` for `key`. Unknown splits yield [`CONTROL`].
    async fn treatment(
        &self,
        key: &Key,
        split_name: &str,
        attributes: Option<&Attributes>,
    ) -> Treatment;

    async fn split_names(&self) -> Vec<String>;

    async fn split(&self, split_name: &str) -> Option<SplitView>;

    async fn splits(&self) -> Vec<SplitView>;

    /// Queues an event; returns whether it was accepted.
    async fn track(&self, event: Event) -> bool;

    fn is_ready(&self) -> bool {
        true
    }
}

pub fn build_evaluator(config: &EvaluatorConfig) -> Result<Arc<dyn Evaluator>, EvaluatorError> {
    match config {
        EvaluatorConfig::Localhost { split_file } => {
            let evaluator = LocalhostEvaluator::from_file(split_file)?;
            tracing::info!(
                split_file = %split_file.display(),
                splits = evaluator.len(),
                "Loaded localhost split definitions"
            );
            Ok(Arc::new(evaluator))
        }
    }
}
