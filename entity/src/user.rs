use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use shared::UserRole;

/// A staff member, the `pin_hash` column must never leave the API,
/// so unlike the other entities this model is not serializable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: DateTime<Utc>,
    #[sea_orm(unique)]
    pub employee_id: String,
    pub full_name: String,
    pub role: UserRole,
    #[sea_orm(unique)]
    pub dispatch_id: Option<String>,
    #[sea_orm(unique)]
    pub license_last4: Option<String>,
    pub pin_hash: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::key_transaction::Entity")]
    KeyTransaction,
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
}

impl Related<super::key_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KeyTransaction.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
