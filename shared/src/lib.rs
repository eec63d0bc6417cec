use sea_orm::DeriveActiveEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter};
use utoipa::ToSchema;

/// Role of a staff member, also the native `user_role` ENUM of the postgres database
///
/// dispatchers manage the fleet and watch the reports, drivers and cleaning
/// staff are the ones actually holding vehicle keys.
#[derive(
    Eq,
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    ToSchema,
    Serialize,
    PartialEq,
    Deserialize,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "DISPATCH")]
    Dispatch,
    #[sea_orm(string_value = "DRIVER")]
    Driver,
    #[sea_orm(string_value = "CLEANING_STAFF")]
    CleaningStaff,
}

impl UserRole {
    /// prefix used when generating employee ids, eg: `DRV12340001`
    pub const fn employee_id_prefix(self) -> &'static str {
        match self {
            Self::Dispatch => "DSP",
            Self::Driver => "DRV",
            Self::CleaningStaff => "CLN",
        }
    }

    /// dispatchers hand keys out, they never hold one themselves
    pub const fn can_hold_keys(self) -> bool {
        !matches!(self, Self::Dispatch)
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(input: &str) -> Result<UserRole, Self::Err> {
        match input {
            "DISPATCH" => Ok(UserRole::Dispatch),
            "DRIVER" => Ok(UserRole::Driver),
            "CLEANING_STAFF" => Ok(UserRole::CleaningStaff),
            _ => Err(()),
        }
    }
}

/// Status of a fleet vehicle, the native `vehicle_status` postgres ENUM
///
/// mirrors the checkout state of the vehicle key, except for `Maintenance`
/// which is set when a key is returned with a bad vehicle condition and
/// `OutOfService` which is set manually by the fleet administrators.
#[derive(
    Eq,
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    ToSchema,
    Serialize,
    PartialEq,
    Deserialize,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "vehicle_status")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "IN_USE")]
    InUse,
    #[sea_orm(string_value = "MAINTENANCE")]
    Maintenance,
    #[sea_orm(string_value = "OUT_OF_SERVICE")]
    OutOfService,
}

/// Status of a physical vehicle key, the native `key_status` postgres ENUM
///
/// `CheckedOut` must hold if and only if the key has exactly one open
/// transaction on the ledger, this is upheld by the checkout / check-in
/// protocol and is the main invariant of the whole system.
#[derive(
    Eq,
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    ToSchema,
    Serialize,
    PartialEq,
    Deserialize,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "key_status")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "CHECKED_OUT")]
    CheckedOut,
    #[sea_orm(string_value = "MAINTENANCE")]
    Maintenance,
    #[sea_orm(string_value = "LOST")]
    Lost,
}

/// Status of a key transaction, the native `transaction_status` postgres ENUM
#[derive(
    Eq,
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    ToSchema,
    Serialize,
    PartialEq,
    Deserialize,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "CHECKED_OUT")]
    CheckedOut,
    #[sea_orm(string_value = "CHECKED_IN")]
    CheckedIn,
}

/// Condition of a vehicle as reported on key return, the native
/// `vehicle_condition` postgres ENUM
#[derive(
    Eq,
    Copy,
    Clone,
    Debug,
    Display,
    EnumIter,
    ToSchema,
    Serialize,
    PartialEq,
    Deserialize,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "vehicle_condition")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleCondition {
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "MINOR_DAMAGE")]
    MinorDamage,
    #[sea_orm(string_value = "MAJOR_DAMAGE")]
    MajorDamage,
    #[sea_orm(string_value = "ACCIDENT")]
    Accident,
}

impl VehicleCondition {
    /// whether returning a vehicle in this condition requires an incident report
    pub const fn requires_incident_report(self) -> bool {
        !matches!(self, Self::Good)
    }
}
