use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One physical sensor instance deployed at an installation, distinct from
/// its catalog type. `measurement_type` (e.g. "dissolved_oxygen") keys the
/// system-wide default bounds when no per-sensor threshold is configured.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "sensors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub installation_id: i32,
    pub name: String,
    pub measurement_type: String,
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
    #[sea_orm(has_one = "super::threshold::Entity")]
    Threshold,
}

impl Related<super::installation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installation.def()
    }
}

impl Related<super::threshold::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Threshold.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
