use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::AlertState;

/// An abnormal-condition record. `sensor_id` is nullable because manual
/// alerts may not concern a specific sensor.
///
/// Flag invariant: `resolved = true` implies `attended = true` and
/// `resolved_at` set; `read` is independent of the other two.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub installation_id: i32,
    pub sensor_id: Option<i32>,
    pub alert_type: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub severity: String,
    pub recorded_value: Option<f64>,
    pub read: bool,
    pub attended: bool,
    pub resolved: bool,
    pub metadata: Option<Json>,
    pub created_at: DateTime,
    pub resolved_at: Option<DateTime>,
}

impl Model {
    pub fn state(&self) -> AlertState {
        AlertState::from_flags(self.read, self.attended, self.resolved)
    }
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
        from = "Column::SensorId",
        to = "super::sensor::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Sensor,
}

impl Related<super::installation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installation.def()
    }
}

impl Related<super::sensor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sensor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
