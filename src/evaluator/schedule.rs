use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, warn};

use crate::entities::schedule_rule;
use crate::error::Result;
use crate::store::{bounded, DEFAULT_STORE_TIMEOUT};
use crate::types::{ActuationIntent, RuleKind};

/// Wraparound clock-window check. A window marked as crossing midnight (e.g.
/// 22:00–06:00) contains 23:30 and 05:00 but not 12:00.
pub fn window_contains(
    start: NaiveTime,
    end: NaiveTime,
    crosses_midnight: bool,
    t: NaiveTime,
) -> bool {
    if crosses_midnight {
        t >= start || t <= end
    } else {
        t >= start && t <= end
    }
}

/// The condition bounds name the desired safe range; a latest value *outside*
/// it makes the rule due.
fn condition_holds(min: Option<f64>, max: Option<f64>, value: f64) -> bool {
    min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max)
}

/// Whether a rule should fire at `now` given the latest known value of its
/// watched sensor. Pure: evaluation never mutates the rule, and a rule still
/// due on re-evaluation simply reports due again ("keep running"). Run-state
/// such as last-fired timestamps belongs to the dispatcher.
pub fn rule_is_due(rule: &schedule_rule::Model, now: NaiveTime, latest: Option<f64>) -> bool {
    if !rule.active {
        return false;
    }
    let kind: RuleKind = match rule.kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            warn!(rule_id = rule.id, "{e}, skipping rule");
            return false;
        }
    };

    if kind.has_window() {
        let in_window = match (rule.start_time, rule.end_time) {
            (Some(start), Some(end)) => window_contains(start, end, rule.crosses_midnight, now),
            // Window rules without both times cannot pass create/update
            // validation; treat stray rows as never due.
            _ => false,
        };
        if !in_window {
            return false;
        }
    }

    if kind.has_condition() {
        let breached = match latest {
            Some(value) => condition_holds(rule.condition_min, rule.condition_max, value),
            None => {
                debug!(
                    rule_id = rule.id,
                    "no latest reading for watched sensor, condition not due"
                );
                false
            }
        };
        if !breached {
            return false;
        }
    }

    true
}

/// Read-only evaluation of an installation's schedule rules. Safe to call
/// repeatedly or concurrently; emits intents, never dispatches them.
pub struct ScheduleEvaluator {
    db: DatabaseConnection,
    timeout: Duration,
}

impl ScheduleEvaluator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Which active rules of this installation are due at `now`, given the
    /// latest reading per sensor id.
    pub async fn due_now(
        &self,
        installation_id: i32,
        readings: &HashMap<i32, f64>,
        now: NaiveDateTime,
    ) -> Result<Vec<ActuationIntent>> {
        bounded(self.timeout, async {
            let rules = schedule_rule::Entity::find()
                .filter(schedule_rule::Column::InstallationId.eq(installation_id))
                .filter(schedule_rule::Column::Active.eq(true))
                .all(&self.db)
                .await?;

            let time_of_day = now.time();
            let intents = rules
                .iter()
                .filter(|rule| {
                    let latest = rule
                        .condition_sensor_id
                        .and_then(|sensor_id| readings.get(&sensor_id).copied());
                    rule_is_due(rule, time_of_day, latest)
                })
                .map(|rule| ActuationIntent {
                    rule_id: rule.id,
                    installation_id: rule.installation_id,
                    action: rule.action.clone(),
                })
                .collect();
            Ok(intents)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleKind;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn rule(kind: RuleKind) -> schedule_rule::Model {
        schedule_rule::Model {
            id: 1,
            installation_id: 1,
            name: "aerator overnight".to_string(),
            kind: kind.as_str().to_string(),
            start_time: None,
            end_time: None,
            crosses_midnight: false,
            condition_sensor_id: None,
            condition_min: None,
            condition_max: None,
            duration_minutes: Some(30),
            action: "aerator_on".to_string(),
            active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn plain_window() {
        assert!(window_contains(t(8, 0), t(18, 0), false, t(12, 0)));
        assert!(window_contains(t(8, 0), t(18, 0), false, t(8, 0)));
        assert!(!window_contains(t(8, 0), t(18, 0), false, t(19, 0)));
    }

    #[test]
    fn midnight_crossing_window() {
        assert!(window_contains(t(22, 0), t(6, 0), true, t(23, 30)));
        assert!(window_contains(t(22, 0), t(6, 0), true, t(5, 0)));
        assert!(!window_contains(t(22, 0), t(6, 0), true, t(12, 0)));
    }

    #[test]
    fn time_window_rule_due_inside_window_only() {
        let mut r = rule(RuleKind::TimeWindow);
        r.start_time = Some(t(22, 0));
        r.end_time = Some(t(6, 0));
        r.crosses_midnight = true;

        assert!(rule_is_due(&r, t(23, 30), None));
        assert!(!rule_is_due(&r, t(12, 0), None));
    }

    #[test]
    fn inactive_rule_is_never_due() {
        let mut r = rule(RuleKind::TimeWindow);
        r.start_time = Some(t(0, 0));
        r.end_time = Some(t(23, 59));
        r.active = false;

        assert!(!rule_is_due(&r, t(12, 0), None));
    }

    #[test]
    fn condition_rule_due_outside_safe_range() {
        let mut r = rule(RuleKind::Condition);
        r.condition_sensor_id = Some(7);
        r.condition_min = Some(4.0);
        r.condition_max = Some(8.0);

        assert!(rule_is_due(&r, t(12, 0), Some(3.5)));
        assert!(rule_is_due(&r, t(12, 0), Some(9.1)));
        assert!(!rule_is_due(&r, t(12, 0), Some(6.0)));
        // No known value: cannot verify the condition, so not due.
        assert!(!rule_is_due(&r, t(12, 0), None));
    }

    #[test]
    fn hybrid_rule_needs_both() {
        let mut r = rule(RuleKind::Hybrid);
        r.start_time = Some(t(22, 0));
        r.end_time = Some(t(6, 0));
        r.crosses_midnight = true;
        r.condition_sensor_id = Some(7);
        r.condition_min = Some(4.0);

        assert!(rule_is_due(&r, t(23, 0), Some(3.0)));
        assert!(!rule_is_due(&r, t(23, 0), Some(5.0))); // in safe range
        assert!(!rule_is_due(&r, t(12, 0), Some(3.0))); // outside window
    }

    #[test]
    fn still_due_on_reevaluation() {
        let mut r = rule(RuleKind::Condition);
        r.condition_sensor_id = Some(7);
        r.condition_min = Some(4.0);

        // The evaluator holds no run-state: the same breach keeps reporting
        // due until the value recovers.
        assert!(rule_is_due(&r, t(10, 0), Some(3.0)));
        assert!(rule_is_due(&r, t(10, 5), Some(3.0)));
        assert!(!rule_is_due(&r, t(10, 10), Some(4.5)));
    }
}
