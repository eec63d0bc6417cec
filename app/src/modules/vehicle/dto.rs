use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListVehiclesDto {
    /// Search by plate number
    pub plate: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleDto {
    #[validate(length(min = 1, max = 32))]
    pub unit_number: String,

    #[validate(length(min = 1, max = 16))]
    pub plate_number: String,

    /// eg: Sedan, Pickup, Van
    #[validate(length(min = 1, max = 32))]
    pub vehicle_type: String,

    #[validate(length(min = 1, max = 64))]
    pub brand: String,

    #[validate(length(min = 1, max = 64))]
    pub model: String,

    #[validate(range(min = 1980, max = 2100))]
    pub year: i16,

    pub color: Option<String>,

    pub additional_info: Option<String>,
}
