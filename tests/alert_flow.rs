mod common;

use aquamon::entities::alert;
use aquamon::error::EngineError;
use aquamon::evaluator::AlertEvaluator;
use aquamon::store::{AlertFilter, AlertStore, NewAlert, ThresholdBounds, ThresholdStore};
use aquamon::types::{AlertKind, AlertState, Reading, Severity};
use chrono::NaiveDateTime;
use common::{seed_installation, seed_sensor, setup_db};
use sea_orm::EntityTrait;
use uuid::Uuid;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn reading(sensor_id: i32, value: f64, taken_at: &str) -> Reading {
    Reading {
        sensor_id,
        value,
        taken_at: at(taken_at),
    }
}

fn critical_bounds(min: f64, max: f64) -> ThresholdBounds {
    ThresholdBounds {
        min_value: Some(min),
        max_value: Some(max),
        optimal_value: None,
        alert_level: Severity::Critical,
        active: true,
    }
}

#[tokio::test]
async fn in_range_readings_create_no_alerts() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "dissolved_oxygen").await;

    let thresholds = ThresholdStore::new(db.clone());
    thresholds
        .upsert(sensor.id, critical_bounds(6.0, 9.0))
        .await
        .unwrap();

    let evaluator = AlertEvaluator::new(db.clone());
    for value in [6.0, 7.5, 9.0] {
        let created = evaluator
            .evaluate(&reading(sensor.id, value, "2026-08-20 10:00:00"))
            .await
            .unwrap();
        assert!(created.is_none(), "value {value} should not alert");
    }

    let total = alert::Entity::find().all(&db).await.unwrap();
    assert!(total.is_empty());
}

#[tokio::test]
async fn breach_dedup_resolve_rearm_scenario() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "dissolved_oxygen").await;

    let thresholds = ThresholdStore::new(db.clone());
    thresholds
        .upsert(sensor.id, critical_bounds(6.0, 9.0))
        .await
        .unwrap();

    let evaluator = AlertEvaluator::new(db.clone());
    let alerts = AlertStore::new(db.clone());

    // First breach creates exactly one alert with the cleared flag triad.
    let first = evaluator
        .evaluate(&reading(sensor.id, 5.2, "2026-08-20 08:00:00"))
        .await
        .unwrap()
        .expect("breach should create an alert");
    assert_eq!(first.severity, "critical");
    assert_eq!(first.recorded_value, Some(5.2));
    assert_eq!(first.alert_type, AlertKind::ThresholdLow.as_str());
    assert!(!first.read && !first.attended && !first.resolved);
    assert_eq!(first.state(), AlertState::Open);
    assert_eq!(first.created_at, at("2026-08-20 08:00:00"));

    // Same direction, still unresolved: suppressed.
    let second = evaluator
        .evaluate(&reading(sensor.id, 5.0, "2026-08-20 08:05:00"))
        .await
        .unwrap();
    assert!(second.is_none());
    let open = alerts
        .list(AlertFilter {
            installation_id: Some(inst.id),
            unresolved_only: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(open.len(), 1);

    // Resolving re-arms the evaluator for that direction.
    let resolved = alerts.resolve(first.id).await.unwrap();
    assert!(resolved.resolved && resolved.attended);
    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.state(), AlertState::Resolved);

    let third = evaluator
        .evaluate(&reading(sensor.id, 5.1, "2026-08-20 09:00:00"))
        .await
        .unwrap();
    assert!(third.is_some(), "resolved alert must not suppress a new breach");
}

#[tokio::test]
async fn opposite_direction_is_not_suppressed() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "temperature").await;

    ThresholdStore::new(db.clone())
        .upsert(sensor.id, critical_bounds(18.0, 30.0))
        .await
        .unwrap();

    let evaluator = AlertEvaluator::new(db.clone());
    let low = evaluator
        .evaluate(&reading(sensor.id, 15.0, "2026-08-20 08:00:00"))
        .await
        .unwrap();
    assert!(low.is_some());

    // An open below-min alert does not stand in for an above-max breach.
    let high = evaluator
        .evaluate(&reading(sensor.id, 35.0, "2026-08-20 08:10:00"))
        .await
        .unwrap()
        .expect("above-max breach should create its own alert");
    assert_eq!(high.alert_type, AlertKind::ThresholdHigh.as_str());
}

#[tokio::test]
async fn default_bounds_raise_warning_alerts() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    // No per-sensor threshold: the seeded dissolved_oxygen defaults (5.0-12.0)
    // apply, at warning severity.
    let sensor = seed_sensor(&db, inst.id, "dissolved_oxygen").await;

    let evaluator = AlertEvaluator::new(db.clone());
    let created = evaluator
        .evaluate(&reading(sensor.id, 3.0, "2026-08-20 08:00:00"))
        .await
        .unwrap()
        .expect("default bounds should still raise");
    assert_eq!(created.severity, "warning");
    let metadata = created.metadata.unwrap();
    assert_eq!(metadata["used_defaults"], true);

    let in_range = evaluator
        .evaluate(&reading(sensor.id, 7.0, "2026-08-20 08:05:00"))
        .await
        .unwrap();
    assert!(in_range.is_none());
}

#[tokio::test]
async fn sensor_without_any_bounds_is_skipped() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    // No threshold and no registered default for this measurement type.
    let sensor = seed_sensor(&db, inst.id, "turbidity").await;

    let created = AlertEvaluator::new(db.clone())
        .evaluate(&reading(sensor.id, 9999.0, "2026-08-20 08:00:00"))
        .await
        .unwrap();
    assert!(created.is_none());
}

#[tokio::test]
async fn unknown_sensor_is_an_error_not_a_skip() {
    let db = setup_db().await;
    let err = AlertEvaluator::new(db.clone())
        .evaluate(&reading(424242, 1.0, "2026-08-20 08:00:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "sensor", .. }));
}

#[tokio::test]
async fn resolve_is_idempotent_and_terminal() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;

    let alerts = AlertStore::new(db.clone());
    let created = alerts
        .create(NewAlert {
            installation_id: inst.id,
            sensor_id: None,
            alert_type: None,
            message: "pump inspection overdue".to_string(),
            severity: Severity::Info,
            recorded_value: None,
            metadata: None,
        })
        .await
        .unwrap();
    assert_eq!(created.alert_type, AlertKind::Manual.as_str());

    let once = alerts.resolve(created.id).await.unwrap();
    let twice = alerts.resolve(created.id).await.unwrap();
    assert_eq!(once.resolved_at, twice.resolved_at);
    assert!(twice.resolved && twice.attended);
    assert_eq!(twice.state(), AlertState::Resolved);
}

#[tokio::test]
async fn mark_read_is_idempotent_and_independent() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;

    let alerts = AlertStore::new(db.clone());
    let created = alerts
        .create(NewAlert {
            installation_id: inst.id,
            sensor_id: None,
            alert_type: None,
            message: "feed hopper low".to_string(),
            severity: Severity::Warning,
            recorded_value: None,
            metadata: None,
        })
        .await
        .unwrap();

    let read = alerts.mark_read(created.id).await.unwrap();
    assert!(read.read && !read.attended && !read.resolved);
    assert_eq!(read.state(), AlertState::Seen);

    let again = alerts.mark_read(created.id).await.unwrap();
    assert!(again.read);

    // resolve does not require read; read stays false-independent
    let attended = alerts.mark_attended(created.id).await.unwrap();
    assert_eq!(attended.state(), AlertState::Attended);
}

#[tokio::test]
async fn mark_all_read_counts_affected_rows() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;

    let alerts = AlertStore::new(db.clone());
    for i in 0..3 {
        alerts
            .create(NewAlert {
                installation_id: inst.id,
                sensor_id: None,
                alert_type: None,
                message: format!("manual alert {i}"),
                severity: Severity::Info,
                recorded_value: None,
                metadata: None,
            })
            .await
            .unwrap();
    }

    assert_eq!(alerts.count_unread(inst.id).await.unwrap(), 3);
    assert_eq!(alerts.mark_all_read(inst.id).await.unwrap(), 3);
    // No unread alerts left: bulk mark is a zero-count success, not an error.
    assert_eq!(alerts.mark_all_read(inst.id).await.unwrap(), 0);
    assert_eq!(alerts.count_unread(inst.id).await.unwrap(), 0);
}

#[tokio::test]
async fn manual_create_validates_required_fields() {
    let db = setup_db().await;
    let alerts = AlertStore::new(db.clone());

    let err = alerts
        .create(NewAlert {
            installation_id: 1,
            sensor_id: None,
            alert_type: None,
            message: "   ".to_string(),
            severity: Severity::Info,
            recorded_value: None,
            metadata: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { field: "message", .. }));

    let err = alerts
        .create(NewAlert {
            installation_id: 0,
            sensor_id: None,
            alert_type: None,
            message: "valid message".to_string(),
            severity: Severity::Info,
            recorded_value: None,
            metadata: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation { field: "installation_id", .. }
    ));
}

#[tokio::test]
async fn lifecycle_ops_on_missing_ids_are_not_found() {
    let db = setup_db().await;
    let alerts = AlertStore::new(db.clone());
    let ghost = Uuid::new_v4();

    assert!(matches!(
        alerts.mark_read(ghost).await.unwrap_err(),
        EngineError::NotFound { .. }
    ));
    assert!(matches!(
        alerts.resolve(ghost).await.unwrap_err(),
        EngineError::NotFound { .. }
    ));
    assert!(matches!(
        alerts.delete(ghost).await.unwrap_err(),
        EngineError::NotFound { .. }
    ));
}

#[tokio::test]
async fn stats_snapshot_counts_by_state_and_severity() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let alerts = AlertStore::new(db.clone());

    let mut ids = Vec::new();
    for severity in [Severity::Critical, Severity::Critical, Severity::Warning, Severity::Info] {
        let a = alerts
            .create(NewAlert {
                installation_id: inst.id,
                sensor_id: None,
                alert_type: None,
                message: format!("{severity} condition"),
                severity,
                recorded_value: None,
                metadata: None,
            })
            .await
            .unwrap();
        ids.push(a.id);
    }
    alerts.mark_read(ids[0]).await.unwrap();
    alerts.resolve(ids[1]).await.unwrap();

    let stats = alerts.stats(inst.id).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.unread, 3);
    assert_eq!(stats.unresolved, 3);
    assert_eq!(stats.critical, 2);
    assert_eq!(stats.warning, 1);
    assert_eq!(stats.info, 1);
}

#[tokio::test]
async fn list_filters_and_limit() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "ph").await;
    let alerts = AlertStore::new(db.clone());

    for i in 0..5 {
        alerts
            .create(NewAlert {
                installation_id: inst.id,
                sensor_id: (i % 2 == 0).then_some(sensor.id),
                alert_type: None,
                message: format!("alert {i}"),
                severity: Severity::Info,
                recorded_value: None,
                metadata: None,
            })
            .await
            .unwrap();
    }

    let by_sensor = alerts
        .list(AlertFilter {
            installation_id: Some(inst.id),
            sensor_id: Some(sensor.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_sensor.len(), 3);

    let limited = alerts
        .list(AlertFilter {
            installation_id: Some(inst.id),
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}
