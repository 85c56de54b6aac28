use std::time::Duration;

/// Runtime configuration for the daemons, collected from the environment
/// (a `.env` file is honored via dotenvy in the binaries).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    pub redis_url: String,
    pub store_timeout: Duration,
    pub schedule_eval_interval: Duration,
    pub worker_concurrency: usize,
    pub metrics_port: u16,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        Self {
            database_url,
            redis_url,
            store_timeout: Duration::from_millis(env_parse("STORE_TIMEOUT_MS", 5_000)),
            schedule_eval_interval: Duration::from_secs(env_parse(
                "SCHEDULE_EVAL_INTERVAL_SECS",
                30,
            )),
            worker_concurrency: env_parse("WORKER_CONCURRENCY", 3) as usize,
            metrics_port: env_parse("METRICS_PORT", 9091) as u16,
        }
    }
}

fn env_parse(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
