//! Metrics definitions for the split API.

use shared::metrics_defs::{MetricDef, MetricType};

pub const API_REQUESTS: MetricDef = MetricDef {
    name: "api.requests",
    metric_type: MetricType::Counter,
    description: "Number of API requests. Tagged with endpoint, status.",
};

pub const API_REQUEST_DURATION: MetricDef = MetricDef {
    name: "api.request.duration",
    metric_type: MetricType::Histogram,
    description: "API request duration in seconds. Tagged with endpoint.",
};

pub const API_VALIDATION_REJECTED: MetricDef = MetricDef {
    name: "api.validation.rejected",
    metric_type: MetricType::Counter,
    description: "Number of requests rejected by input validation. Tagged with endpoint.",
};

pub const ALL_METRICS: &[MetricDef] = &[API_REQUESTS, API_REQUEST_DURATION, API_VALIDATION_REJECTED];
