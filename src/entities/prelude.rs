pub use super::alert::Entity as Alert;
pub use super::default_threshold::Entity as DefaultThreshold;
pub use super::installation::Entity as Installation;
pub use super::schedule_rule::Entity as ScheduleRule;
pub use super::sensor::Entity as Sensor;
pub use super::threshold::Entity as Threshold;
