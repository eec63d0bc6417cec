use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::UserRole;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListStaffDto {
    /// Search by full name
    pub name: Option<String>,
}

/// A staff member row on the dispatch staff listing
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMemberDto {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub employee_id: String,
    pub full_name: String,
    pub role: UserRole,
    pub license_last4: Option<String>,
    pub is_active: bool,
}

impl From<entity::user::Model> for StaffMemberDto {
    fn from(m: entity::user::Model) -> Self {
        Self {
            id: m.id,
            created_at: m.created_at,
            employee_id: m.employee_id,
            full_name: m.full_name,
            role: m.role,
            license_last4: m.license_last4,
            is_active: m.is_active,
        }
    }
}
