use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::VehicleCondition;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutDto {
    /// id of the key to check out
    pub key_id: i32,
}

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInDto {
    pub vehicle_condition: VehicleCondition,

    /// required when the vehicle condition is not GOOD,
    /// trimmed length must be between 10 and 1000 characters
    pub incident_report: Option<String>,
}

/// An open loan of the request user, with enough context to find
/// the vehicle on the lot and return the key
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenLoanDto {
    pub id: i32,
    pub key_number: String,
    pub location: String,
    pub unit_number: String,
    pub plate_number: String,
    pub brand: String,
    pub model: String,
    pub checkout_time: DateTime<Utc>,
    pub hours_out: i64,
    pub is_overdue: bool,
}
