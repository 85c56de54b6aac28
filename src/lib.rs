pub mod config;
pub mod entities;
pub mod error;
pub mod evaluator;
pub mod ingest;
pub mod metrics;
pub mod migrator;
pub mod store;
pub mod telemetry;
pub mod types;

pub use sea_orm;
pub use redis;

pub use error::{EngineError, Result};
