use aquamon::config::EngineConfig;
use aquamon::{ingest, metrics as engine_metrics, migrator, telemetry};
use sea_orm::Database;

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    telemetry::init_telemetry("aquamon-worker");

    let config = EngineConfig::from_env();

    // Standalone Prometheus scrape endpoint
    let metrics_addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .expect("failed to install Prometheus exporter");
    tracing::info!("Metrics endpoint listening on {}", metrics_addr);

    // Database Connection
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    engine_metrics::init_metrics(&db).await;

    // Redis Connection
    let redis_client = redis::Client::open(config.redis_url.as_str()).expect("Invalid Redis URL");

    tracing::info!(
        "Starting ingest workers (concurrency={})...",
        config.worker_concurrency
    );
    ingest::start_ingest_workers(
        redis_client,
        db,
        config.worker_concurrency,
        config.store_timeout,
    )
    .await;

    // Keep the main process alive
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down worker process"),
        Err(err) => tracing::error!("Unable to listen for shutdown signal: {}", err),
    }
}
