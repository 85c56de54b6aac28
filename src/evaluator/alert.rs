use std::time::Duration;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::{alert, default_threshold, sensor, threshold};
use crate::error::{EngineError, Result};
use crate::store::alert::find_open_on;
use crate::store::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::types::{BreachDirection, Reading, Severity};

/// Bounds actually used for one evaluation: either the sensor's configured
/// threshold or the system-wide defaults for its measurement type.
struct ResolvedBounds {
    min: Option<f64>,
    max: Option<f64>,
    severity: Severity,
    from_defaults: bool,
}

/// Decides, per reading, whether to raise an alert. Produces exactly 0 or 1
/// alert rows per evaluated reading and never talks to anything but the
/// database.
pub struct AlertEvaluator {
    db: DatabaseConnection,
    timeout: Duration,
}

impl AlertEvaluator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Evaluate one reading against its sensor's bounds.
    ///
    /// Returns the created alert, or `None` when the reading is in range, no
    /// bounds are configured, or an open alert for the same sensor and breach
    /// direction already stands (de-duplication). A failed threshold lookup is
    /// an error, never "no breach".
    pub async fn evaluate(&self, reading: &Reading) -> Result<Option<alert::Model>> {
        bounded(self.timeout, self.evaluate_inner(reading)).await
    }

    async fn evaluate_inner(&self, reading: &Reading) -> Result<Option<alert::Model>> {
        let sensor = sensor::Entity::find_by_id(reading.sensor_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| EngineError::not_found("sensor", reading.sensor_id))?;

        let bounds = match self.resolve_bounds(&sensor).await? {
            Some(bounds) => bounds,
            None => {
                debug!(sensor_id = sensor.id, "no bounds configured, skipping evaluation");
                return Ok(None);
            }
        };

        let direction = match breach_direction(reading.value, bounds.min, bounds.max) {
            Some(direction) => direction,
            None => return Ok(None),
        };

        // Check-then-insert must be atomic: two concurrent breaching readings
        // for the same sensor/direction may otherwise both pass the open-alert
        // check and create duplicates.
        let txn = self.db.begin().await?;

        if let Some(open) = find_open_on(&txn, sensor.id, direction).await? {
            txn.commit().await?;
            debug!(
                sensor_id = sensor.id,
                open_alert = %open.id,
                "breach repeats an open alert, suppressed"
            );
            return Ok(None);
        }

        let breached_bound = match direction {
            BreachDirection::BelowMin => bounds.min,
            BreachDirection::AboveMax => bounds.max,
        };
        let message = match direction {
            BreachDirection::BelowMin => format!(
                "{}: {} reading {:.2} below minimum {:.2}",
                sensor.name,
                sensor.measurement_type,
                reading.value,
                breached_bound.unwrap_or_default()
            ),
            BreachDirection::AboveMax => format!(
                "{}: {} reading {:.2} above maximum {:.2}",
                sensor.name,
                sensor.measurement_type,
                reading.value,
                breached_bound.unwrap_or_default()
            ),
        };
        let metadata = serde_json::json!({
            "breached_bound": breached_bound,
            "measurement_type": sensor.measurement_type,
            "used_defaults": bounds.from_defaults,
        });

        let am = alert::ActiveModel {
            id: Set(Uuid::new_v4()),
            installation_id: Set(sensor.installation_id),
            sensor_id: Set(Some(sensor.id)),
            alert_type: Set(direction.alert_kind().as_str().to_string()),
            message: Set(message),
            severity: Set(bounds.severity.as_str().to_string()),
            recorded_value: Set(Some(reading.value)),
            read: Set(false),
            attended: Set(false),
            resolved: Set(false),
            metadata: Set(Some(metadata)),
            created_at: Set(reading.taken_at),
            resolved_at: Set(None),
        };
        let created = am.insert(&txn).await?;
        txn.commit().await?;

        metrics::counter!(
            "aquamon_alerts_created_total",
            "severity" => bounds.severity.as_str()
        )
        .increment(1);
        info!(
            alert_id = %created.id,
            sensor_id = sensor.id,
            value = reading.value,
            severity = %bounds.severity,
            "alert created"
        );

        Ok(Some(created))
    }

    /// Per-sensor threshold if one is active, else the advisory defaults for
    /// the sensor's measurement type. Defaults carry no alert level, so they
    /// raise at `warning`.
    async fn resolve_bounds(&self, sensor: &sensor::Model) -> Result<Option<ResolvedBounds>> {
        let configured = threshold::Entity::find()
            .filter(threshold::Column::SensorId.eq(sensor.id))
            .filter(threshold::Column::Active.eq(true))
            .one(&self.db)
            .await?;

        if let Some(t) = configured {
            let severity = t.alert_level.parse().unwrap_or_else(|_| {
                warn!(
                    threshold_id = t.id,
                    alert_level = %t.alert_level,
                    "unknown alert_level on threshold, defaulting to warning"
                );
                Severity::Warning
            });
            if t.min_value.is_none() && t.max_value.is_none() {
                return Ok(None);
            }
            return Ok(Some(ResolvedBounds {
                min: t.min_value,
                max: t.max_value,
                severity,
                from_defaults: false,
            }));
        }

        let defaults = default_threshold::Entity::find()
            .filter(default_threshold::Column::MeasurementType.eq(sensor.measurement_type.as_str()))
            .one(&self.db)
            .await?;

        Ok(defaults.and_then(|d| {
            if d.min_value.is_none() && d.max_value.is_none() {
                return None;
            }
            Some(ResolvedBounds {
                min: d.min_value,
                max: d.max_value,
                severity: Severity::Warning,
                from_defaults: true,
            })
        }))
    }
}

/// Strict comparison against the configured bounds; `optimal_value` never
/// enters into it.
fn breach_direction(value: f64, min: Option<f64>, max: Option<f64>) -> Option<BreachDirection> {
    if min.is_some_and(|min| value < min) {
        Some(BreachDirection::BelowMin)
    } else if max.is_some_and(|max| value > max) {
        Some(BreachDirection::AboveMax)
    } else {
        None
    }
}
