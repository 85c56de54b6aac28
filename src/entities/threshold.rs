use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Configured safe-value bounds for one installed sensor. The unique index on
/// `sensor_id` keeps exactly one row per sensor; superseded thresholds are
/// deactivated rather than deleted so historical alerts retain provenance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "thresholds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub sensor_id: i32,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub optimal_value: Option<f64>,
    pub alert_level: String,
    pub active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sensor::Entity",
        from = "Column::SensorId",
        to = "super::sensor::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Sensor,
}

impl Related<super::sensor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sensor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
