use super::dto::{KeyAvailabilityDto, KeySearchResultDto, RegisterKeyDto};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionError, TransactionTrait,
};
use shared::{KeyStatus, TransactionStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegisterKeyError {
    #[error("key number already registered")]
    KeyNumberInUse,

    #[error("vehicle not found")]
    VehicleNotFound,

    #[error("vehicle already has a key assigned")]
    VehicleAlreadyHasKey,

    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum SearchKeyError {
    #[error("no key found with this number")]
    NotFound,

    #[error("key is not available, current status: {0}")]
    NotAvailable(KeyStatus),

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// registers a physical key for a vehicle, enforcing the unique key number
/// and the one key per vehicle rule
pub async fn register_key(
    db: &DatabaseConnection,
    dto: RegisterKeyDto,
) -> Result<entity::vehicle_key::Model, RegisterKeyError> {
    let key_number = dto.key_number.trim().to_uppercase();

    db.transaction::<_, entity::vehicle_key::Model, RegisterKeyError>(|tx| {
        Box::pin(async move {
            let number_taken = entity::vehicle_key::Entity::find()
                .filter(entity::vehicle_key::Column::KeyNumber.eq(&key_number))
                .one(tx)
                .await?
                .is_some();

            if number_taken {
                return Err(RegisterKeyError::KeyNumberInUse);
            }

            entity::vehicle::Entity::find_by_id(dto.vehicle_id)
                .one(tx)
                .await?
                .ok_or(RegisterKeyError::VehicleNotFound)?;

            let vehicle_has_key = entity::vehicle_key::Entity::find()
                .filter(entity::vehicle_key::Column::VehicleId.eq(dto.vehicle_id))
                .one(tx)
                .await?
                .is_some();

            if vehicle_has_key {
                return Err(RegisterKeyError::VehicleAlreadyHasKey);
            }

            let key = entity::vehicle_key::ActiveModel {
                created_at: Set(Utc::now()),
                key_number: Set(key_number),
                vehicle_id: Set(dto.vehicle_id),
                location: Set(dto.location.trim().to_owned()),
                notes: Set(dto.notes),
                status: Set(KeyStatus::Available),
                ..Default::default()
            }
            .insert(tx)
            .await?;

            Ok(key)
        })
    })
    .await
    .map_err(|e| match e {
        TransactionError::Connection(e) => RegisterKeyError::Db(e),
        TransactionError::Transaction(e) => e,
    })
}

/// finds a key by the number printed on its tag (case insensitive exact match)
/// and classifies its availability relative to the caller
pub async fn search_by_number(
    db: &DatabaseConnection,
    number: &str,
    caller_id: i32,
) -> Result<KeySearchResultDto, SearchKeyError> {
    let normalized = number.trim().to_uppercase();

    let (key, vehicle) = entity::vehicle_key::Entity::find()
        .filter(entity::vehicle_key::Column::KeyNumber.eq(normalized))
        .find_also_related(entity::vehicle::Entity)
        .one(db)
        .await?
        .ok_or(SearchKeyError::NotFound)?;

    let vehicle = vehicle.ok_or(DbErr::Custom(String::from(
        "key is not associated with a vehicle",
    )))?;

    let availability = match key.status {
        KeyStatus::Available => KeyAvailabilityDto::Available,

        KeyStatus::CheckedOut => {
            let (open_loan, holder) = entity::key_transaction::Entity::find()
                .filter(entity::key_transaction::Column::KeyId.eq(key.id))
                .filter(
                    entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedOut),
                )
                .find_also_related(entity::user::Entity)
                .one(db)
                .await?
                .ok_or(DbErr::Custom(String::from(
                    "key marked CHECKED_OUT without an open loan",
                )))?;

            if open_loan.user_id == caller_id {
                KeyAvailabilityDto::CheckedOutByMe {
                    loan_id: open_loan.id,
                }
            } else {
                KeyAvailabilityDto::CheckedOutByOther {
                    holder_name: holder.map(|u| u.full_name).unwrap_or_default(),
                }
            }
        }

        status => return Err(SearchKeyError::NotAvailable(status)),
    };

    Ok(KeySearchResultDto {
        key,
        vehicle,
        availability,
    })
}
