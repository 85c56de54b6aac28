use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A scheduled-actuation rule: run `action` inside a clock window
/// (`time_window`), while a watched sensor is outside its safe range
/// (`condition`), or both (`hybrid`). Evaluation never mutates this row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "schedule_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub installation_id: i32,
    pub name: String,
    pub kind: String,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub crosses_midnight: bool,
    pub condition_sensor_id: Option<i32>,
    pub condition_min: Option<f64>,
    pub condition_max: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub action: String,
    pub active: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::installation::Entity",
        from = "Column::InstallationId",
        to = "super::installation::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Installation,
    #[sea_orm(
        belongs_to = "super::sensor::Entity",
        from = "Column::ConditionSensorId",
        to = "super::sensor::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    ConditionSensor,
}

impl Related<super::installation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
