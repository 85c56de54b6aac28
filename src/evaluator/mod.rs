pub mod alert;
pub mod schedule;

pub use alert::AlertEvaluator;
pub use schedule::{rule_is_due, window_contains, ScheduleEvaluator};
