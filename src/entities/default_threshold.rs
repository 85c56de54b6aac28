use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System-wide recommended bounds per measurement type, used as advisory
/// fallback when a sensor has no configured threshold. Never auto-promoted to
/// a per-sensor threshold.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "default_thresholds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub measurement_type: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub optimal_value: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
