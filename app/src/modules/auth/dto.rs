use crate::modules::common::validators::{
    REGEX_IS_FOUR_DIGITS, REGEX_IS_PERSON_NAME, REGEX_IS_PIN,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::UserRole;
use utoipa::ToSchema;
use validator::Validate;

// --- INPUT

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignIn {
    /// role to authenticate as, decides how the identifier is looked up:
    /// dispatchers by their dispatch id, everyone else by the last 4
    /// digits of their drivers license
    pub role: UserRole,

    #[validate(length(min = 1, max = 32))]
    pub identifier: String,

    #[validate(regex(path = "REGEX_IS_PIN", message = "PIN must be 4 to 6 digits"))]
    pub pin: String,
}

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStaff {
    #[validate(length(min = 3, max = 100))]
    #[validate(regex(
        path = "REGEX_IS_PERSON_NAME",
        message = "name can only contain letters and spaces"
    ))]
    pub full_name: String,

    #[validate(regex(
        path = "REGEX_IS_FOUR_DIGITS",
        message = "license digits must be exactly 4 numbers"
    ))]
    pub license_last4: String,

    /// only DRIVER and CLEANING_STAFF can self register,
    /// dispatch accounts are provisioned by administrators
    pub role: UserRole,

    #[validate(regex(path = "REGEX_IS_PIN", message = "PIN must be 4 to 6 digits"))]
    pub pin: String,
}

// --- OUTPUT

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub user: UserDto,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub ip: String,
    pub public_id: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: String,

    /// if this session is the same that was used on the request that is returning this
    pub same_as_from_request: bool,
}

/// A staff member as seen by the API consumers, never carries the pin hash
#[derive(Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub employee_id: String,
    pub full_name: String,
    pub role: UserRole,
    pub dispatch_id: Option<String>,
    pub license_last4: Option<String>,
    pub is_active: bool,
}

impl From<entity::user::Model> for UserDto {
    fn from(m: entity::user::Model) -> Self {
        Self {
            id: m.id,
            created_at: m.created_at,
            employee_id: m.employee_id,
            full_name: m.full_name,
            role: m.role,
            dispatch_id: m.dispatch_id,
            license_last4: m.license_last4,
            is_active: m.is_active,
        }
    }
}

impl From<entity::session::Model> for SessionDto {
    fn from(m: entity::session::Model) -> Self {
        Self {
            ip: m.ip,
            public_id: m.public_id,
            user_agent: m.user_agent,
            created_at: m.created_at,
            expires_at: m.expires_at,
            same_as_from_request: false,
        }
    }
}
