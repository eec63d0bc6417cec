//! Tests for the printed key number search and its caller relative
//! availability classification.

mod common;

use app::modules::key::dto::KeyAvailabilityDto;
use app::modules::key::repository::{self, SearchKeyError};
use app::modules::loan::service;
use common::*;
use sea_orm::{ActiveModelTrait, Set};
use shared::KeyStatus;

#[tokio::test]
async fn available_key_is_found_case_insensitively() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;
    let (vehicle, key) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;

    for needle in ["K001", "k001", "  k001  "] {
        let result = repository::search_by_number(&db, needle, driver.id)
            .await
            .unwrap_or_else(|_| panic!("search for {:?} should find the key", needle));

        assert_eq!(result.key.id, key.id);
        assert_eq!(result.vehicle.id, vehicle.id);
        assert_eq!(result.availability, KeyAvailabilityDto::Available);
    }
}

#[tokio::test]
async fn unknown_number_is_not_found() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;

    let result = repository::search_by_number(&db, "K999", driver.id).await;

    assert!(matches!(result, Err(SearchKeyError::NotFound)));
}

#[tokio::test]
async fn key_held_by_the_caller_offers_the_open_loan() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;
    let (_, key) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;

    let loan = service::checkout(&db, driver.id, key.id, 5).await.unwrap();

    let result = repository::search_by_number(&db, "K001", driver.id)
        .await
        .unwrap();

    assert_eq!(
        result.availability,
        KeyAvailabilityDto::CheckedOutByMe { loan_id: loan.id }
    );
}

#[tokio::test]
async fn key_held_by_someone_else_only_names_the_holder() {
    let db = test_db().await;

    let holder = seed_staff(&db, "Juan Perez", shared::UserRole::Driver, Some("5678"), None).await;
    let searcher = seed_driver(&db, "4321").await;
    let (_, key) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;

    service::checkout(&db, holder.id, key.id, 5).await.unwrap();

    let result = repository::search_by_number(&db, "K001", searcher.id)
        .await
        .unwrap();

    assert_eq!(
        result.availability,
        KeyAvailabilityDto::CheckedOutByOther {
            holder_name: String::from("Juan Perez")
        }
    );
}

#[tokio::test]
async fn maintenance_and_lost_keys_report_their_status() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;

    for (i, status) in [KeyStatus::Maintenance, KeyStatus::Lost].into_iter().enumerate() {
        let vehicle = seed_vehicle(
            &db,
            &format!("UNIT-{:03}", i),
            &format!("PLT-{:03}", i),
        )
        .await;

        let mut key: entity::vehicle_key::ActiveModel =
            seed_key(&db, vehicle.id, &format!("K{:03}", i)).await.into();
        key.status = Set(status);
        let key = key.update(&db).await.unwrap();

        let result = repository::search_by_number(&db, &key.key_number, driver.id).await;

        assert!(matches!(result, Err(SearchKeyError::NotAvailable(s)) if s == status));
    }
}
