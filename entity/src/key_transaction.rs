use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use shared::{TransactionStatus, VehicleCondition};
use utoipa::ToSchema;

/// A checkout / check-in event on the key ledger
///
/// rows are created `CheckedOut`, transition once to `CheckedIn` and are
/// never updated again nor deleted, forming the audit trail of the fleet.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, ToSchema)]
#[schema(as = entity::key_transaction::Model)]
#[sea_orm(table_name = "key_transaction")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub key_id: i32,
    pub user_id: i32,
    pub status: TransactionStatus,
    pub checkout_time: DateTime<Utc>,
    pub checkin_time: Option<DateTime<Utc>>,
    pub vehicle_condition: Option<VehicleCondition>,
    pub incident_report: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle_key::Entity",
        from = "Column::KeyId",
        to = "super::vehicle_key::Column::Id",
        on_update = "Cascade",
        on_delete = "NoAction"
    )]
    VehicleKey,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "NoAction"
    )]
    User,
}

impl Related<super::vehicle_key::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleKey.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
