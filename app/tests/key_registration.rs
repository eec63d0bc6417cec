//! Tests for physical key registration: unique printed numbers, the one
//! key per vehicle rule and uppercase normalization.

mod common;

use app::modules::key::dto::RegisterKeyDto;
use app::modules::key::repository::{self, RegisterKeyError};
use common::*;
use shared::KeyStatus;

fn register_dto(key_number: &str, vehicle_id: i32) -> RegisterKeyDto {
    RegisterKeyDto {
        key_number: key_number.to_owned(),
        vehicle_id,
        location: String::from("Hook B2"),
        notes: None,
    }
}

#[tokio::test]
async fn key_number_is_normalized_to_uppercase() {
    let db = test_db().await;

    let vehicle = seed_vehicle(&db, "UNIT-001", "ABC-123").await;

    let key = repository::register_key(&db, register_dto("k001", vehicle.id))
        .await
        .expect("registration should succeed");

    assert_eq!(key.key_number, "K001");
    assert_eq!(key.status, KeyStatus::Available);
    assert_eq!(key.vehicle_id, vehicle.id);
}

#[tokio::test]
async fn duplicate_key_number_is_rejected_case_insensitively() {
    let db = test_db().await;

    let vehicle_a = seed_vehicle(&db, "UNIT-001", "ABC-123").await;
    let vehicle_b = seed_vehicle(&db, "UNIT-002", "DEF-456").await;

    repository::register_key(&db, register_dto("K001", vehicle_a.id))
        .await
        .unwrap();

    let duplicate = repository::register_key(&db, register_dto("k001", vehicle_b.id)).await;

    assert!(matches!(duplicate, Err(RegisterKeyError::KeyNumberInUse)));
}

#[tokio::test]
async fn vehicle_can_only_have_one_key() {
    let db = test_db().await;

    let vehicle = seed_vehicle(&db, "UNIT-001", "ABC-123").await;

    repository::register_key(&db, register_dto("K001", vehicle.id))
        .await
        .unwrap();

    let second = repository::register_key(&db, register_dto("K002", vehicle.id)).await;

    assert!(matches!(
        second,
        Err(RegisterKeyError::VehicleAlreadyHasKey)
    ));
}

#[tokio::test]
async fn key_for_missing_vehicle_is_rejected() {
    let db = test_db().await;

    let result = repository::register_key(&db, register_dto("K001", 424242)).await;

    assert!(matches!(result, Err(RegisterKeyError::VehicleNotFound)));
}
