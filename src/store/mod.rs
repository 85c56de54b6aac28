use std::future::Future;
use std::time::Duration;

use crate::error::{EngineError, Result};

pub mod alert;
pub mod schedule;
pub mod threshold;

pub use alert::{AlertFilter, AlertStats, AlertStore, NewAlert};
pub use schedule::{NewScheduleRule, ScheduleRuleUpdate, ScheduleStore};
pub use threshold::{ThresholdBounds, ThresholdStore};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound a store operation by a deadline. A hung database surfaces as
/// `EngineError::Timeout`; retrying is the caller's policy, never ours.
pub(crate) async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Timeout(timeout)),
    }
}
