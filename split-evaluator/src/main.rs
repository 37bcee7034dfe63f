mod config;

use clap::{Args, Parser, Subcommand};
use config::{Config, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use shared::metrics_defs::MetricType;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(about = "REST facade over a Split feature flag evaluator")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the evaluation API
    Run(ConfigArgs),
    /// Load and validate the config file, then exit
    CheckConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long)]
    config_path: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Run(args) => {
            let config = match Config::from_file(&args.config_path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to load config: {e}");
                    return ExitCode::FAILURE;
                }
            };
            run(config)
        }
        CliCommand::CheckConfig(args) => match Config::from_file(&args.config_path) {
            Ok(_) => {
                println!("Config is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Invalid config: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(config: Config) -> ExitCode {
    let _sentry_guard = init_logging(config.common.logging.as_ref());

    if let Some(metrics_config) = &config.common.metrics
        && let Err(e) = init_metrics(metrics_config)
    {
        tracing::error!(error = %e, "Failed to initialize metrics");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Starting split evaluator");
    match runtime.block_on(split_api::run(config.api)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Split evaluator stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: Option<&LoggingConfig>) -> Option<sentry::ClientInitGuard> {
    let default_level = config
        .and_then(|c| c.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let sentry_guard = config.and_then(|c| c.sentry_dsn.as_deref()).map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    sentry_guard
}

fn init_metrics(config: &MetricsConfig) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(config.prefix.as_str()))?;
    metrics::set_global_recorder(recorder).map_err(|e| e.to_string())?;

    for def in split_api::ALL_METRICS {
        match def.metric_type {
            MetricType::Counter => metrics::describe_counter!(def.name, def.description),
            MetricType::Gauge => metrics::describe_gauge!(def.name, def.description),
            MetricType::Histogram => metrics::describe_histogram!(def.name, def.description),
        }
    }

    Ok(())
}
