use super::dto::CreateVehicleDto;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};
use shared::VehicleStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreateVehicleError {
    #[error("unit number already registered")]
    UnitNumberInUse,

    #[error("plate number already registered")]
    PlateInUse,

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// creates a vehicle with the AVAILABLE status after checking the unit and
/// plate numbers are free
pub async fn create_vehicle<C: sea_orm::ConnectionTrait>(
    conn: &C,
    dto: &CreateVehicleDto,
) -> Result<entity::vehicle::Model, CreateVehicleError> {
    let unit_taken = entity::vehicle::Entity::find()
        .filter(entity::vehicle::Column::UnitNumber.eq(dto.unit_number.trim()))
        .one(conn)
        .await?
        .is_some();

    if unit_taken {
        return Err(CreateVehicleError::UnitNumberInUse);
    }

    let plate_taken = entity::vehicle::Entity::find()
        .filter(entity::vehicle::Column::PlateNumber.eq(dto.plate_number.trim()))
        .one(conn)
        .await?
        .is_some();

    if plate_taken {
        return Err(CreateVehicleError::PlateInUse);
    }

    let vehicle = entity::vehicle::ActiveModel {
        created_at: Set(Utc::now()),
        unit_number: Set(dto.unit_number.trim().to_owned()),
        plate_number: Set(dto.plate_number.trim().to_owned()),
        vehicle_type: Set(dto.vehicle_type.clone()),
        brand: Set(dto.brand.clone()),
        model: Set(dto.model.clone()),
        year: Set(dto.year),
        color: Set(dto.color.clone()),
        additional_info: Set(dto.additional_info.clone()),
        status: Set(VehicleStatus::Available),
        ..Default::default()
    };

    Ok(vehicle.insert(conn).await?)
}
