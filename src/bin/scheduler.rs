use std::collections::HashMap;

use aquamon::config::EngineConfig;
use aquamon::entities::{installation, sensor};
use aquamon::evaluator::ScheduleEvaluator;
use aquamon::ingest::{latest_reading_key, ACTUATION_QUEUE};
use aquamon::{metrics as engine_metrics, migrator, telemetry};
use redis::AsyncCommands;
use sea_orm::{ColumnTrait, Database, EntityTrait, QueryFilter};

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    telemetry::init_telemetry("aquamon-scheduler");

    let config = EngineConfig::from_env();

    let metrics_addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .expect("failed to install Prometheus exporter");
    tracing::info!("Metrics endpoint listening on {}", metrics_addr);

    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    engine_metrics::init_metrics(&db).await;

    let redis_client = redis::Client::open(config.redis_url.as_str()).expect("Invalid Redis URL");
    let evaluator = ScheduleEvaluator::with_timeout(db.clone(), config.store_timeout);

    tracing::info!(
        "Schedule evaluation loop started (interval={:?})",
        config.schedule_eval_interval
    );

    loop {
        if let Err(e) = evaluate_once(&db, &redis_client, &evaluator).await {
            tracing::error!("Schedule evaluation pass failed: {}", e);
        }
        tokio::time::sleep(config.schedule_eval_interval).await;
    }
}

/// One evaluation pass over every installation: gather cached latest readings,
/// ask the evaluator which rules are due, and hand the intents to the
/// dispatcher queue.
async fn evaluate_once(
    db: &sea_orm::DatabaseConnection,
    redis_client: &redis::Client,
    evaluator: &ScheduleEvaluator,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = redis_client.get_multiplexed_async_connection().await?;
    let now = chrono::Utc::now().naive_utc();

    let installations = installation::Entity::find().all(db).await?;
    for inst in installations {
        let sensors = sensor::Entity::find()
            .filter(sensor::Column::InstallationId.eq(inst.id))
            .filter(sensor::Column::Active.eq(true))
            .all(db)
            .await?;

        let mut readings: HashMap<i32, f64> = HashMap::new();
        for s in &sensors {
            let cached: Option<f64> = conn.get(latest_reading_key(s.id)).await?;
            if let Some(value) = cached {
                readings.insert(s.id, value);
            }
        }

        let intents = evaluator.due_now(inst.id, &readings, now).await?;
        for intent in intents {
            let payload = serde_json::to_string(&intent)?;
            let _: () = conn.lpush(ACTUATION_QUEUE, payload).await?;
            metrics::counter!("aquamon_actuation_intents_total").increment(1);
            tracing::info!(
                rule_id = intent.rule_id,
                installation_id = intent.installation_id,
                action = %intent.action,
                "actuation intent emitted"
            );
        }
    }

    Ok(())
}
