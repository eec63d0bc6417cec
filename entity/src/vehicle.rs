use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use shared::VehicleStatus;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, ToSchema)]
#[schema(as = entity::vehicle::Model)]
#[sea_orm(table_name = "vehicle")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: DateTime<Utc>,
    #[sea_orm(unique)]
    pub unit_number: String,
    #[sea_orm(unique)]
    pub plate_number: String,
    pub vehicle_type: String,
    pub brand: String,
    pub model: String,
    pub year: i16,
    pub color: Option<String>,
    pub additional_info: Option<String>,
    pub status: VehicleStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// 1:1 in practice, enforced by the key registration flow
    /// rather than by a schema level constraint
    #[sea_orm(has_many = "super::vehicle_key::Entity")]
    VehicleKey,
}

impl Related<super::vehicle_key::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleKey.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
