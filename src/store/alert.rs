use std::time::Duration;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::alert;
use crate::error::{EngineError, Result};
use crate::store::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::types::{AlertKind, BreachDirection, Severity};

pub const DEFAULT_LIST_LIMIT: u64 = 50;

/// Input for a manually raised alert.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub installation_id: i32,
    pub sensor_id: Option<i32>,
    pub alert_type: Option<AlertKind>,
    pub message: String,
    pub severity: Severity,
    pub recorded_value: Option<f64>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub installation_id: Option<i32>,
    pub sensor_id: Option<i32>,
    pub unread_only: bool,
    pub unresolved_only: bool,
    pub limit: Option<u64>,
}

/// Point-in-time snapshot over an installation's alert set. Computed fresh on
/// each call rather than kept as running counters, so it cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AlertStats {
    pub total: u64,
    pub unread: u64,
    pub unresolved: u64,
    pub critical: u64,
    pub warning: u64,
    pub info: u64,
}

pub struct AlertStore {
    db: DatabaseConnection,
    timeout: Duration,
}

impl AlertStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub async fn create(&self, new: NewAlert) -> Result<alert::Model> {
        if new.installation_id <= 0 {
            return Err(EngineError::validation(
                "installation_id",
                "installation_id is required",
            ));
        }
        if new.message.trim().is_empty() {
            return Err(EngineError::validation("message", "message is required"));
        }

        bounded(self.timeout, async {
            let am = alert::ActiveModel {
                id: Set(Uuid::new_v4()),
                installation_id: Set(new.installation_id),
                sensor_id: Set(new.sensor_id),
                alert_type: Set(new.alert_type.unwrap_or(AlertKind::Manual).as_str().to_string()),
                message: Set(new.message),
                severity: Set(new.severity.as_str().to_string()),
                recorded_value: Set(new.recorded_value),
                read: Set(false),
                attended: Set(false),
                resolved: Set(false),
                metadata: Set(new.metadata),
                created_at: Set(chrono::Utc::now().naive_utc()),
                resolved_at: Set(None),
            };
            Ok(am.insert(&self.db).await?)
        })
        .await
    }

    pub async fn get(&self, id: Uuid) -> Result<alert::Model> {
        bounded(self.timeout, async {
            alert::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| EngineError::not_found("alert", id))
        })
        .await
    }

    pub async fn list(&self, filter: AlertFilter) -> Result<Vec<alert::Model>> {
        bounded(self.timeout, async {
            let mut q = alert::Entity::find();
            if let Some(installation_id) = filter.installation_id {
                q = q.filter(alert::Column::InstallationId.eq(installation_id));
            }
            if let Some(sensor_id) = filter.sensor_id {
                q = q.filter(alert::Column::SensorId.eq(sensor_id));
            }
            if filter.unread_only {
                q = q.filter(alert::Column::Read.eq(false));
            }
            if filter.unresolved_only {
                q = q.filter(alert::Column::Resolved.eq(false));
            }
            Ok(q
                .order_by_desc(alert::Column::CreatedAt)
                .limit(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT))
                .all(&self.db)
                .await?)
        })
        .await
    }

    /// Mark one alert as read. Already-read alerts are a no-op success.
    pub async fn mark_read(&self, id: Uuid) -> Result<alert::Model> {
        bounded(self.timeout, async {
            let model = alert::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| EngineError::not_found("alert", id))?;

            if model.read {
                return Ok(model);
            }
            let mut am: alert::ActiveModel = model.into();
            am.read = Set(true);
            Ok(am.update(&self.db).await?)
        })
        .await
    }

    /// Bulk-read every currently unread alert of an installation. Returns the
    /// number of rows touched; zero matches is not an error.
    pub async fn mark_all_read(&self, installation_id: i32) -> Result<u64> {
        bounded(self.timeout, async {
            let res = alert::Entity::update_many()
                .col_expr(alert::Column::Read, Expr::value(true))
                .filter(alert::Column::InstallationId.eq(installation_id))
                .filter(alert::Column::Read.eq(false))
                .exec(&self.db)
                .await?;
            Ok(res.rows_affected)
        })
        .await
    }

    /// Operator triage step between Seen and Resolved.
    pub async fn mark_attended(&self, id: Uuid) -> Result<alert::Model> {
        bounded(self.timeout, async {
            let model = alert::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| EngineError::not_found("alert", id))?;

            if model.attended {
                return Ok(model);
            }
            let mut am: alert::ActiveModel = model.into();
            am.attended = Set(true);
            Ok(am.update(&self.db).await?)
        })
        .await
    }

    /// Resolve an alert: terminal state. Resolving always implies attending,
    /// and re-resolving a resolved alert is a no-op success.
    pub async fn resolve(&self, id: Uuid) -> Result<alert::Model> {
        bounded(self.timeout, async {
            let model = alert::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| EngineError::not_found("alert", id))?;

            if model.resolved {
                return Ok(model);
            }
            let mut am: alert::ActiveModel = model.into();
            am.resolved = Set(true);
            am.attended = Set(true);
            am.resolved_at = Set(Some(chrono::Utc::now().naive_utc()));
            Ok(am.update(&self.db).await?)
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        bounded(self.timeout, async {
            let res = alert::Entity::delete_by_id(id).exec(&self.db).await?;
            if res.rows_affected == 0 {
                return Err(EngineError::not_found("alert", id));
            }
            Ok(())
        })
        .await
    }

    pub async fn count_unread(&self, installation_id: i32) -> Result<u64> {
        bounded(self.timeout, async {
            Ok(alert::Entity::find()
                .filter(alert::Column::InstallationId.eq(installation_id))
                .filter(alert::Column::Read.eq(false))
                .count(&self.db)
                .await?)
        })
        .await
    }

    pub async fn stats(&self, installation_id: i32) -> Result<AlertStats> {
        bounded(self.timeout, async {
            let base = || {
                alert::Entity::find().filter(alert::Column::InstallationId.eq(installation_id))
            };
            let by_severity = |sev: Severity| {
                base().filter(alert::Column::Severity.eq(sev.as_str()))
            };

            Ok(AlertStats {
                total: base().count(&self.db).await?,
                unread: base()
                    .filter(alert::Column::Read.eq(false))
                    .count(&self.db)
                    .await?,
                unresolved: base()
                    .filter(alert::Column::Resolved.eq(false))
                    .count(&self.db)
                    .await?,
                critical: by_severity(Severity::Critical).count(&self.db).await?,
                warning: by_severity(Severity::Warning).count(&self.db).await?,
                info: by_severity(Severity::Info).count(&self.db).await?,
            })
        })
        .await
    }

    /// The open (unresolved) alert for a sensor in a given breach direction,
    /// if one exists. The evaluator calls the free-function variant inside its
    /// de-dup transaction; this wrapper serves read paths.
    pub async fn find_open(
        &self,
        sensor_id: i32,
        direction: BreachDirection,
    ) -> Result<Option<alert::Model>> {
        bounded(self.timeout, async {
            find_open_on(&self.db, sensor_id, direction).await
        })
        .await
    }
}

/// Open-alert lookup usable on a plain connection or inside a transaction.
pub(crate) async fn find_open_on<C: ConnectionTrait>(
    conn: &C,
    sensor_id: i32,
    direction: BreachDirection,
) -> Result<Option<alert::Model>> {
    Ok(alert::Entity::find()
        .filter(alert::Column::SensorId.eq(sensor_id))
        .filter(alert::Column::AlertType.eq(direction.alert_kind().as_str()))
        .filter(alert::Column::Resolved.eq(false))
        .one(conn)
        .await?)
}
