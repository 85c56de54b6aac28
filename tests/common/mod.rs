use aquamon::entities::{installation, sensor};
use aquamon::migrator::Migrator;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory database with the full schema applied. One connection in
/// the pool, so every query sees the same memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_installation(db: &DatabaseConnection) -> installation::Model {
    installation::ActiveModel {
        name: Set("Estanque Norte".to_string()),
        location: Set(Some("Sector 3".to_string())),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert installation")
}

pub async fn seed_sensor(
    db: &DatabaseConnection,
    installation_id: i32,
    measurement_type: &str,
) -> sensor::Model {
    sensor::ActiveModel {
        installation_id: Set(installation_id),
        name: Set(format!("{measurement_type} probe")),
        measurement_type: Set(measurement_type.to_string()),
        active: Set(true),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert sensor")
}
