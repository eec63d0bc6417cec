use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use shared::KeyStatus;
use utoipa::ToSchema;

/// A physical vehicle key hanging on the dispatch key board
///
/// `key_number` is the number printed on the key tag, stored uppercase
/// so lookups by the printed number are case insensitive.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, ToSchema)]
#[schema(as = entity::vehicle_key::Model)]
#[sea_orm(table_name = "vehicle_key")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: DateTime<Utc>,
    #[sea_orm(unique)]
    pub key_number: String,
    pub vehicle_id: i32,
    pub location: String,
    pub notes: Option<String>,
    pub status: KeyStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id",
        on_update = "Cascade",
        on_delete = "NoAction"
    )]
    Vehicle,
    #[sea_orm(has_many = "super::key_transaction::Entity")]
    KeyTransaction,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::key_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KeyTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
