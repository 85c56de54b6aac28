use std::time::Duration;

/// Engine-level error taxonomy. Mutations on missing ids are `NotFound`,
/// contradictory input is `Validation` naming the offending field, and store
/// failures surface as `Timeout`/`Unavailable` for the caller's retry policy
/// to deal with — the engine never retries internally.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed on '{field}': {message}")]
    Validation { field: &'static str, message: String },

    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    #[error("concurrent update detected on {entity} (id={id})")]
    Conflict { entity: &'static str, id: String },

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("store unavailable: {0}")]
    Unavailable(#[from] sea_orm::DbErr),
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
