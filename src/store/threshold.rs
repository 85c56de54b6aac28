use std::time::Duration;

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QuerySelect, RelationTrait, Set,
};
use tracing::warn;

use crate::entities::{default_threshold, sensor, threshold};
use crate::error::{EngineError, Result};
use crate::store::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::types::Severity;

/// Operator-supplied bounds for one sensor. `optimal_value` is informational
/// only and never triggers an alert.
#[derive(Debug, Clone)]
pub struct ThresholdBounds {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub optimal_value: Option<f64>,
    pub alert_level: Severity,
    pub active: bool,
}

pub struct ThresholdStore {
    db: DatabaseConnection,
    timeout: Duration,
}

impl ThresholdStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Insert-or-update the single threshold row for a sensor, keyed on
    /// `sensor_id`. Returns the resulting row.
    pub async fn upsert(&self, sensor_id: i32, bounds: ThresholdBounds) -> Result<threshold::Model> {
        if let (Some(min), Some(max)) = (bounds.min_value, bounds.max_value) {
            if min > max {
                return Err(EngineError::validation(
                    "min_value",
                    format!("min_value {min} is greater than max_value {max}"),
                ));
            }
        }
        // Soft invariant: an optimal outside [min, max] is a config warning,
        // not a rejection.
        if let Some(optimal) = bounds.optimal_value {
            let below = bounds.min_value.is_some_and(|min| optimal < min);
            let above = bounds.max_value.is_some_and(|max| optimal > max);
            if below || above {
                warn!(
                    sensor_id,
                    optimal, "optimal_value lies outside [min_value, max_value]"
                );
            }
        }

        bounded(self.timeout, async {
            let now = chrono::Utc::now().naive_utc();
            let am = threshold::ActiveModel {
                sensor_id: Set(sensor_id),
                min_value: Set(bounds.min_value),
                max_value: Set(bounds.max_value),
                optimal_value: Set(bounds.optimal_value),
                alert_level: Set(bounds.alert_level.as_str().to_string()),
                active: Set(bounds.active),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };

            threshold::Entity::insert(am)
                .on_conflict(
                    OnConflict::column(threshold::Column::SensorId)
                        .update_columns([
                            threshold::Column::MinValue,
                            threshold::Column::MaxValue,
                            threshold::Column::OptimalValue,
                            threshold::Column::AlertLevel,
                            threshold::Column::Active,
                            threshold::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(&self.db)
                .await?;

            threshold::Entity::find()
                .filter(threshold::Column::SensorId.eq(sensor_id))
                .one(&self.db)
                .await?
                .ok_or_else(|| {
                    EngineError::Unavailable(sea_orm::DbErr::RecordNotFound(format!(
                        "threshold for sensor {sensor_id} missing after upsert"
                    )))
                })
        })
        .await
    }

    /// The threshold configured for a sensor, if any. A sensor legitimately
    /// may have none.
    pub async fn get(&self, sensor_id: i32) -> Result<Option<threshold::Model>> {
        bounded(self.timeout, async {
            Ok(threshold::Entity::find()
                .filter(threshold::Column::SensorId.eq(sensor_id))
                .one(&self.db)
                .await?)
        })
        .await
    }

    pub async fn list_for_installation(
        &self,
        installation_id: i32,
    ) -> Result<Vec<threshold::Model>> {
        bounded(self.timeout, async {
            Ok(threshold::Entity::find()
                .join(JoinType::InnerJoin, threshold::Relation::Sensor.def())
                .filter(sensor::Column::InstallationId.eq(installation_id))
                .all(&self.db)
                .await?)
        })
        .await
    }

    /// Supersede (or re-arm) a threshold without deleting it, so historical
    /// alerts keep their provenance.
    pub async fn set_active(&self, threshold_id: i32, active: bool) -> Result<threshold::Model> {
        bounded(self.timeout, async {
            let model = threshold::Entity::find_by_id(threshold_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| EngineError::not_found("threshold", threshold_id))?;

            let mut am: threshold::ActiveModel = model.into();
            am.active = Set(active);
            am.updated_at = Set(chrono::Utc::now().naive_utc());
            Ok(am.update(&self.db).await?)
        })
        .await
    }

    pub async fn delete(&self, threshold_id: i32) -> Result<()> {
        bounded(self.timeout, async {
            let res = threshold::Entity::delete_by_id(threshold_id)
                .exec(&self.db)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::not_found("threshold", threshold_id));
            }
            Ok(())
        })
        .await
    }

    /// Best-effort system-wide recommended bounds for a measurement type.
    /// Advisory only: the evaluator may alert off these, but they are never
    /// persisted as a per-sensor threshold.
    pub async fn get_defaults(
        &self,
        measurement_type: &str,
    ) -> Result<Option<default_threshold::Model>> {
        bounded(self.timeout, async {
            Ok(default_threshold::Entity::find()
                .filter(default_threshold::Column::MeasurementType.eq(measurement_type))
                .one(&self.db)
                .await?)
        })
        .await
    }
}
