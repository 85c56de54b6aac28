mod common;

use aquamon::error::EngineError;
use aquamon::store::{ThresholdBounds, ThresholdStore};
use aquamon::types::Severity;
use common::{seed_installation, seed_sensor, setup_db};

fn bounds(min: f64, max: f64) -> ThresholdBounds {
    ThresholdBounds {
        min_value: Some(min),
        max_value: Some(max),
        optimal_value: None,
        alert_level: Severity::Warning,
        active: true,
    }
}

#[tokio::test]
async fn upsert_inserts_then_replaces_in_place() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "dissolved_oxygen").await;
    let store = ThresholdStore::new(db.clone());

    let created = store.upsert(sensor.id, bounds(6.0, 9.0)).await.unwrap();
    assert_eq!(created.min_value, Some(6.0));
    assert_eq!(created.alert_level, "warning");

    let mut tighter = bounds(6.5, 8.5);
    tighter.alert_level = Severity::Critical;
    let replaced = store.upsert(sensor.id, tighter).await.unwrap();

    // Same row, updated in place: one active threshold per sensor.
    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.min_value, Some(6.5));
    assert_eq!(replaced.alert_level, "critical");

    let fetched = store.get(sensor.id).await.unwrap().unwrap();
    assert_eq!(fetched.max_value, Some(8.5));
}

#[tokio::test]
async fn upsert_rejects_inverted_bounds() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "ph").await;

    let err = ThresholdStore::new(db.clone())
        .upsert(sensor.id, bounds(9.0, 6.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { field: "min_value", .. }));
}

#[tokio::test]
async fn optimal_outside_bounds_is_accepted() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "ph").await;

    // Soft invariant: logged, not rejected.
    let mut b = bounds(6.5, 9.0);
    b.optimal_value = Some(12.0);
    let created = ThresholdStore::new(db.clone())
        .upsert(sensor.id, b)
        .await
        .unwrap();
    assert_eq!(created.optimal_value, Some(12.0));
}

#[tokio::test]
async fn get_without_configured_threshold_is_none() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "temperature").await;

    let fetched = ThresholdStore::new(db.clone()).get(sensor.id).await.unwrap();
    assert!(fetched.is_none());
}

#[tokio::test]
async fn defaults_lookup_by_measurement_type() {
    let db = setup_db().await;
    let store = ThresholdStore::new(db.clone());

    let oxygen = store.get_defaults("dissolved_oxygen").await.unwrap().unwrap();
    assert_eq!(oxygen.min_value, Some(5.0));
    assert_eq!(oxygen.max_value, Some(12.0));

    // Unregistered type: absent, not an error.
    assert!(store.get_defaults("salinity").await.unwrap().is_none());
}

#[tokio::test]
async fn set_active_supersedes_without_deleting() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let sensor = seed_sensor(&db, inst.id, "dissolved_oxygen").await;
    let store = ThresholdStore::new(db.clone());

    let created = store.upsert(sensor.id, bounds(6.0, 9.0)).await.unwrap();
    let deactivated = store.set_active(created.id, false).await.unwrap();
    assert!(!deactivated.active);

    // Row still present for provenance.
    assert!(store.get(sensor.id).await.unwrap().is_some());

    let err = store.set_active(9999, false).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn list_for_installation_joins_through_sensors() {
    let db = setup_db().await;
    let inst = seed_installation(&db).await;
    let other = seed_installation(&db).await;
    let s1 = seed_sensor(&db, inst.id, "dissolved_oxygen").await;
    let s2 = seed_sensor(&db, inst.id, "ph").await;
    let s3 = seed_sensor(&db, other.id, "ph").await;
    let store = ThresholdStore::new(db.clone());

    store.upsert(s1.id, bounds(5.0, 12.0)).await.unwrap();
    store.upsert(s2.id, bounds(6.5, 9.0)).await.unwrap();
    store.upsert(s3.id, bounds(6.5, 9.0)).await.unwrap();

    let listed = store.list_for_installation(inst.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|t| t.sensor_id == s1.id || t.sensor_id == s2.id));
}

#[tokio::test]
async fn delete_missing_threshold_is_not_found() {
    let db = setup_db().await;
    let err = ThresholdStore::new(db.clone()).delete(404).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}
