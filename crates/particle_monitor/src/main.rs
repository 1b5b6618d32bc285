mod config;

use common::domain::{MeasurementRepository, RandomRowIdGenerator, SystemClock};
use common::garde::format_report;
use common::http::HttpLoggingConfig;
use common::in_memory::InMemoryMeasurementRepository;
use common::postgres::{PostgresClient, PostgresMeasurementRepository};
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig, TelemetryProviders};
use config::{ServiceConfig, StoreBackend};
use garde::Validate;
use measurements_api::domain::{IngestService, QueryService};
use measurements_api::http::{AppState, HttpServerConfig};
use measurements_api::measurements_api::MeasurementsApi;
use particle_runner::Runner;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(report) = config.validate() {
        eprintln!("Invalid configuration: {}", format_report(&report));
        std::process::exit(1);
    }

    let mut telemetry_config =
        TelemetryConfig::console(config.otel_service_name.clone(), config.log_level.clone());
    if config.otel_enabled {
        telemetry_config = telemetry_config.with_otlp(config.otel_endpoint.clone());
    }

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&telemetry_config) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        store_backend = ?config.store_backend,
        "Starting particle-monitor service"
    );
    debug!(
        http_host = %config.http_host,
        http_port = config.http_port,
        store_timeout_ms = config.store_timeout_ms,
        "Loaded configuration"
    );

    let repository = match initialize_repository(&config).await {
        Ok(repository) => repository,
        Err(e) => {
            error!("Failed to initialize measurement store: {:#}", e);
            shutdown_telemetry(telemetry_providers);
            std::process::exit(1);
        }
    };

    let ingest_service = Arc::new(IngestService::new(
        repository.clone(),
        Arc::new(SystemClock),
        Arc::new(RandomRowIdGenerator),
        config.store_timeout(),
    ));
    let query_service = Arc::new(QueryService::new(repository, config.store_timeout()));

    let http_config = HttpServerConfig {
        host: config.http_host.clone(),
        port: config.http_port,
        request_timeout: config.request_timeout(),
        logging_config: HttpLoggingConfig::from_comma_separated(&config.http_ignored_paths),
    };

    let measurements_api = MeasurementsApi::new(
        AppState::new(ingest_service, query_service),
        http_config,
    );

    let result = Runner::new()
        .with_named_process("measurements_api", measurements_api.into_runner_process())
        .with_closer(move || async move {
            info!("Running cleanup tasks...");
            shutdown_telemetry(telemetry_providers);
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10))
        .run()
        .await;

    if let Err(e) = result {
        eprintln!("Application exiting with error: {:#}", e);
        std::process::exit(1);
    }
}

async fn initialize_repository(
    config: &ServiceConfig,
) -> anyhow::Result<Arc<dyn MeasurementRepository>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            info!("Initializing PostgreSQL...");
            let client = PostgresClient::from_config(&config.postgres())?;
            client.ping().await?;
            client.run_migrations().await?;
            info!(
                host = %config.postgres_host,
                database = %config.postgres_database,
                "PostgreSQL ready"
            );
            Ok(Arc::new(PostgresMeasurementRepository::new(client)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory measurement store; data is lost on restart");
            Ok(Arc::new(InMemoryMeasurementRepository::new()))
        }
    }
}
