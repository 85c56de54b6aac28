use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use sea_orm::DatabaseConnection;

use crate::evaluator::AlertEvaluator;
use crate::types::Reading;

/// Queue the ingest adapter pushes readings onto.
pub const READING_QUEUE: &str = "reading_queue";
/// Queue the scheduler pushes actuation intents onto for the dispatcher.
pub const ACTUATION_QUEUE: &str = "actuation_queue";

/// Redis key caching the latest value seen for a sensor; the scheduler reads
/// these when checking condition rules.
pub fn latest_reading_key(sensor_id: i32) -> String {
    format!("latest_reading:{sensor_id}")
}

/// Spawn `concurrency` loops consuming readings off the ingest queue. Each
/// reading updates the latest-value cache and runs the alert evaluator.
/// Malformed payloads and evaluation failures are logged and skipped; the
/// loops never die.
pub async fn start_ingest_workers(
    redis_client: redis::Client,
    db: DatabaseConnection,
    concurrency: usize,
    store_timeout: Duration,
) {
    let redis_client = Arc::new(redis_client);
    let evaluator = Arc::new(AlertEvaluator::with_timeout(db, store_timeout));

    for i in 0..concurrency {
        let redis_client = redis_client.clone();
        let evaluator = evaluator.clone();

        tokio::spawn(async move {
            tracing::info!("Ingest worker {} started", i);
            loop {
                let mut conn = match redis_client.get_multiplexed_async_connection().await {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::error!("Ingest worker {}: Failed to get redis conn: {}", i, e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let result: redis::RedisResult<(String, String)> =
                    conn.blpop(READING_QUEUE, 0.0).await;

                match result {
                    Ok((_key, payload_str)) => {
                        let reading: Reading = match serde_json::from_str(&payload_str) {
                            Ok(r) => r,
                            Err(e) => {
                                tracing::error!("Ingest worker {}: Bad payload: {}", i, e);
                                continue;
                            }
                        };
                        process_reading(&reading, &evaluator, &mut conn, i).await;
                    }
                    Err(e) => {
                        tracing::error!("Ingest worker {}: Redis error: {}", i, e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });
    }
}

async fn process_reading(
    reading: &Reading,
    evaluator: &AlertEvaluator,
    conn: &mut redis::aio::MultiplexedConnection,
    worker_id: usize,
) {
    metrics::counter!("aquamon_readings_ingested_total").increment(1);

    // Cache the latest value first: the schedule evaluator wants it even when
    // alert evaluation fails.
    let cache: redis::RedisResult<()> = conn
        .set(latest_reading_key(reading.sensor_id), reading.value)
        .await;
    if let Err(e) = cache {
        tracing::error!(
            "Ingest worker {}: Failed to cache latest reading for sensor {}: {}",
            worker_id,
            reading.sensor_id,
            e
        );
    }

    match evaluator.evaluate(reading).await {
        Ok(Some(alert)) => {
            metrics::gauge!("aquamon_open_alerts").increment(1.0);
            tracing::info!(
                alert_id = %alert.id,
                sensor_id = reading.sensor_id,
                "reading breached threshold, alert raised"
            );
        }
        Ok(None) => {}
        Err(e) => {
            // Failed-to-evaluate, not "no breach": make the failure loud.
            metrics::counter!("aquamon_evaluation_failures_total").increment(1);
            tracing::error!(
                sensor_id = reading.sensor_id,
                value = reading.value,
                "failed to evaluate reading: {}",
                e
            );
        }
    }
}
