pub mod alert;
pub mod default_threshold;
pub mod installation;
pub mod schedule_rule;
pub mod sensor;
pub mod threshold;

pub use alert::Entity as Alert;
pub use default_threshold::Entity as DefaultThreshold;
pub use installation::Entity as Installation;
pub use schedule_rule::Entity as ScheduleRule;
pub use sensor::Entity as Sensor;
pub use threshold::Entity as Threshold;

pub mod prelude;
