use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{UserRole, VehicleCondition};
use utoipa::ToSchema;

/// Fleet wide counters shown on the dispatch panel
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FleetOverviewDto {
    pub total_keys: u64,
    pub available_keys: u64,
    pub checked_out_keys: u64,
    pub maintenance_keys: u64,
    pub lost_keys: u64,
    pub active_loans: u64,
    pub overdue_loans: u64,
    pub staff_count: u64,
}

#[derive(Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummaryDto {
    pub unit_number: String,
    pub plate_number: String,
    pub brand: String,
    pub model: String,
}

impl From<&entity::vehicle::Model> for VehicleSummaryDto {
    fn from(m: &entity::vehicle::Model) -> Self {
        Self {
            unit_number: m.unit_number.clone(),
            plate_number: m.plate_number.clone(),
            brand: m.brand.clone(),
            model: m.model.clone(),
        }
    }
}

#[derive(Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HolderDto {
    pub full_name: String,
    pub employee_id: String,
    pub license_last4: Option<String>,
}

impl From<&entity::user::Model> for HolderDto {
    fn from(m: &entity::user::Model) -> Self {
        Self {
            full_name: m.full_name.clone(),
            employee_id: m.employee_id.clone(),
            license_last4: m.license_last4.clone(),
        }
    }
}

/// An open loan on the dispatch panel, the overdue flag is derived from
/// the checkout time on every read
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLoanDto {
    pub loan_id: i32,
    pub key_number: String,
    pub location: String,
    pub vehicle: VehicleSummaryDto,
    pub holder: HolderDto,
    pub checkout_time: DateTime<Utc>,
    pub hours_out: i64,
    pub is_overdue: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUsageDto {
    pub vehicle: entity::vehicle::Model,
    /// amount of closed loans on the vehicle key
    pub completed_loans: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffUsageDto {
    pub full_name: String,
    pub employee_id: String,
    pub role: UserRole,
    pub license_last4: Option<String>,
    pub completed_loans: u64,
    /// up to two most used vehicles, as `brand model (uses)`
    pub top_vehicles: Vec<String>,
}

/// A closed loan whose vehicle condition was not GOOD
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDto {
    pub loan_id: i32,
    pub key_number: String,
    pub vehicle: VehicleSummaryDto,
    pub reported_by: HolderDto,
    pub vehicle_condition: VehicleCondition,
    pub incident_report: Option<String>,
    pub checkin_time: Option<DateTime<Utc>>,
}
