use std::time::Duration;

use chrono::NaiveTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::schedule_rule;
use crate::error::{EngineError, Result};
use crate::store::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::types::RuleKind;

/// Input for a new scheduled-actuation rule.
#[derive(Debug, Clone)]
pub struct NewScheduleRule {
    pub installation_id: i32,
    pub name: String,
    pub kind: RuleKind,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub crosses_midnight: bool,
    pub condition_sensor_id: Option<i32>,
    pub condition_min: Option<f64>,
    pub condition_max: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub action: String,
    pub active: bool,
}

/// Typed partial update: only present fields are applied, onto a copy of the
/// current row, and the *merged* record is re-validated before persisting.
/// Nullable fields cannot be cleared through a partial update; replace the
/// rule instead.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRuleUpdate {
    pub name: Option<String>,
    pub kind: Option<RuleKind>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub crosses_midnight: Option<bool>,
    pub condition_sensor_id: Option<i32>,
    pub condition_min: Option<f64>,
    pub condition_max: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub action: Option<String>,
    pub active: Option<bool>,
}

impl ScheduleRuleUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.kind.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.crosses_midnight.is_none()
            && self.condition_sensor_id.is_none()
            && self.condition_min.is_none()
            && self.condition_max.is_none()
            && self.duration_minutes.is_none()
            && self.action.is_none()
            && self.active.is_none()
    }
}

pub struct ScheduleStore {
    db: DatabaseConnection,
    timeout: Duration,
}

impl ScheduleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub async fn list(&self, installation_id: i32) -> Result<Vec<schedule_rule::Model>> {
        bounded(self.timeout, async {
            Ok(schedule_rule::Entity::find()
                .filter(schedule_rule::Column::InstallationId.eq(installation_id))
                .order_by_desc(schedule_rule::Column::CreatedAt)
                .all(&self.db)
                .await?)
        })
        .await
    }

    pub async fn get(&self, id: i32) -> Result<schedule_rule::Model> {
        bounded(self.timeout, async {
            schedule_rule::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| EngineError::not_found("schedule_rule", id))
        })
        .await
    }

    pub async fn create(&self, new: NewScheduleRule) -> Result<schedule_rule::Model> {
        let candidate = schedule_rule::Model {
            id: 0,
            installation_id: new.installation_id,
            name: new.name,
            kind: new.kind.as_str().to_string(),
            start_time: new.start_time,
            end_time: new.end_time,
            crosses_midnight: new.crosses_midnight,
            condition_sensor_id: new.condition_sensor_id,
            condition_min: new.condition_min,
            condition_max: new.condition_max,
            duration_minutes: new.duration_minutes,
            action: new.action,
            active: new.active,
            created_at: chrono::Utc::now().naive_utc(),
        };
        validate_rule(&candidate)?;

        bounded(self.timeout, async {
            let am = schedule_rule::ActiveModel {
                installation_id: Set(candidate.installation_id),
                name: Set(candidate.name),
                kind: Set(candidate.kind),
                start_time: Set(candidate.start_time),
                end_time: Set(candidate.end_time),
                crosses_midnight: Set(candidate.crosses_midnight),
                condition_sensor_id: Set(candidate.condition_sensor_id),
                condition_min: Set(candidate.condition_min),
                condition_max: Set(candidate.condition_max),
                duration_minutes: Set(candidate.duration_minutes),
                action: Set(candidate.action),
                active: Set(candidate.active),
                created_at: Set(candidate.created_at),
                ..Default::default()
            };
            Ok(am.insert(&self.db).await?)
        })
        .await
    }

    pub async fn update(
        &self,
        id: i32,
        update: ScheduleRuleUpdate,
    ) -> Result<schedule_rule::Model> {
        if update.is_empty() {
            return Err(EngineError::validation("update", "no fields to update"));
        }

        bounded(self.timeout, async {
            let current = schedule_rule::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| EngineError::not_found("schedule_rule", id))?;

            let mut merged = current.clone();
            if let Some(name) = update.name {
                merged.name = name;
            }
            if let Some(kind) = update.kind {
                merged.kind = kind.as_str().to_string();
            }
            if let Some(start_time) = update.start_time {
                merged.start_time = Some(start_time);
            }
            if let Some(end_time) = update.end_time {
                merged.end_time = Some(end_time);
            }
            if let Some(crosses_midnight) = update.crosses_midnight {
                merged.crosses_midnight = crosses_midnight;
            }
            if let Some(sensor_id) = update.condition_sensor_id {
                merged.condition_sensor_id = Some(sensor_id);
            }
            if let Some(min) = update.condition_min {
                merged.condition_min = Some(min);
            }
            if let Some(max) = update.condition_max {
                merged.condition_max = Some(max);
            }
            if let Some(duration) = update.duration_minutes {
                merged.duration_minutes = Some(duration);
            }
            if let Some(action) = update.action {
                merged.action = action;
            }
            if let Some(active) = update.active {
                merged.active = active;
            }
            validate_rule(&merged)?;

            let mut am: schedule_rule::ActiveModel = current.into();
            am.name = Set(merged.name);
            am.kind = Set(merged.kind);
            am.start_time = Set(merged.start_time);
            am.end_time = Set(merged.end_time);
            am.crosses_midnight = Set(merged.crosses_midnight);
            am.condition_sensor_id = Set(merged.condition_sensor_id);
            am.condition_min = Set(merged.condition_min);
            am.condition_max = Set(merged.condition_max);
            am.duration_minutes = Set(merged.duration_minutes);
            am.action = Set(merged.action);
            am.active = Set(merged.active);
            Ok(am.update(&self.db).await?)
        })
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        bounded(self.timeout, async {
            let res = schedule_rule::Entity::delete_by_id(id).exec(&self.db).await?;
            if res.rows_affected == 0 {
                return Err(EngineError::not_found("schedule_rule", id));
            }
            Ok(())
        })
        .await
    }
}

/// Invariant checks over a complete rule record. Runs against the merged
/// result of a partial update, not just the supplied fields.
pub(crate) fn validate_rule(rule: &schedule_rule::Model) -> Result<()> {
    if rule.name.trim().is_empty() {
        return Err(EngineError::validation("name", "name is required"));
    }
    if rule.action.trim().is_empty() {
        return Err(EngineError::validation("action", "action is required"));
    }
    let kind: RuleKind = rule
        .kind
        .parse()
        .map_err(|e: String| EngineError::validation("kind", e))?;

    if kind.has_window() {
        let (start, end) = match (rule.start_time, rule.end_time) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(EngineError::validation(
                    "start_time",
                    format!("{} rules require start_time and end_time", kind.as_str()),
                ));
            }
        };
        if !rule.crosses_midnight && start > end {
            return Err(EngineError::validation(
                "end_time",
                "end_time precedes start_time; mark the rule as crossing midnight if intended",
            ));
        }
    }

    if kind.has_condition() {
        if rule.condition_sensor_id.is_none() {
            return Err(EngineError::validation(
                "condition_sensor_id",
                format!("{} rules require a watched sensor", kind.as_str()),
            ));
        }
        if rule.condition_min.is_none() && rule.condition_max.is_none() {
            return Err(EngineError::validation(
                "condition_min",
                "condition rules require at least one of condition_min/condition_max",
            ));
        }
        if let (Some(min), Some(max)) = (rule.condition_min, rule.condition_max) {
            if min > max {
                return Err(EngineError::validation(
                    "condition_min",
                    format!("condition_min {min} is greater than condition_max {max}"),
                ));
            }
        }
    }

    Ok(())
}
