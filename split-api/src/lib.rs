pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod evaluator;
mod metrics_defs;
pub mod query;
pub mod service;
pub mod validation;

#[cfg(test)]
mod testutils;

pub use errors::ApiError;
pub use metrics_defs::ALL_METRICS;
pub use service::ApiService;

use shared::admin_service::AdminService;
use shared::http::run_http_service;

/// Loads the configured evaluator and serves the API and admin listeners
/// until one of them fails.
pub async fn run(config: config::Config) -> Result<(), ApiError> {
    let evaluator = evaluator::build_evaluator(&config.evaluator)?;

    let api_service = ApiService::new(config.auth_token.clone(), evaluator.clone());
    let admin_service = AdminService::<_, ApiError>::new(move || evaluator.is_ready());

    let api_task = run_http_service(&config.listener.host, config.listener.port, api_service);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );

    tokio::try_join!(api_task, admin_task)?;
    Ok(())
}
