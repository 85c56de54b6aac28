use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::{alert, schedule_rule, sensor};

/// Seed the dashboard gauges from current database state at daemon startup.
/// Counters (alerts created, intents emitted) are incremented at the call
/// sites as things happen.
pub async fn init_metrics(db: &DatabaseConnection) {
    let open_alerts = alert::Entity::find()
        .filter(alert::Column::Resolved.eq(false))
        .count(db)
        .await
        .unwrap_or(0);
    metrics::gauge!("aquamon_open_alerts").set(open_alerts as f64);

    let active_rules = schedule_rule::Entity::find()
        .filter(schedule_rule::Column::Active.eq(true))
        .count(db)
        .await
        .unwrap_or(0);
    metrics::gauge!("aquamon_active_schedule_rules").set(active_rules as f64);

    let sensors = sensor::Entity::find()
        .filter(sensor::Column::Active.eq(true))
        .count(db)
        .await
        .unwrap_or(0);
    metrics::gauge!("aquamon_active_sensors").set(sensors as f64);

    tracing::info!(
        "Initialized metrics: OpenAlerts={}, ActiveRules={}, ActiveSensors={}",
        open_alerts,
        active_rules,
        sensors
    );
}
