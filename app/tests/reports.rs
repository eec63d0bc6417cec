//! Tests for the read only dispatch reporting views: the derived overdue
//! flag, fleet counters, usage aggregations and the incident list.

mod common;

use app::modules::common::dto::Pagination;
use app::modules::common::extractors::{DbConnection, ValidatedQuery};
use app::modules::loan::service;
use app::modules::report::routes;
use chrono::{Duration, Utc};
use common::*;
use migration::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use shared::VehicleCondition;

/// backdates the checkout time of a loan, as if the key had been taken
/// `hours` hours ago
async fn backdate_loan(db: &sea_orm::DatabaseConnection, loan_id: i32, hours: i64) {
    entity::key_transaction::Entity::update_many()
        .col_expr(
            entity::key_transaction::Column::CheckoutTime,
            Expr::value(Utc::now() - Duration::hours(hours)),
        )
        .filter(entity::key_transaction::Column::Id.eq(loan_id))
        .exec(db)
        .await
        .unwrap();
}

#[tokio::test]
async fn loans_over_12_hours_old_are_flagged_overdue() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;
    let (_, old_key) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;
    let (_, recent_key) = seed_vehicle_with_key(&db, "UNIT-002", "DEF-456", "K002").await;

    let old_loan = service::checkout(&db, driver.id, old_key.id, 5).await.unwrap();
    let recent_loan = service::checkout(&db, driver.id, recent_key.id, 5)
        .await
        .unwrap();

    backdate_loan(&db, old_loan.id, 13).await;
    backdate_loan(&db, recent_loan.id, 11).await;

    let active = routes::active_loans(DbConnection(db.clone())).await.ok().unwrap().0;
    assert_eq!(active.len(), 2);

    let overdue = routes::overdue_loans(DbConnection(db.clone())).await.ok().unwrap().0;
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].loan_id, old_loan.id);
    assert!(overdue[0].is_overdue);
    assert!(overdue[0].hours_out >= 13);
}

#[tokio::test]
async fn overview_counts_keys_loans_and_staff() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;
    seed_dispatcher(&db, "0001").await;

    let (_, key_a) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;
    seed_vehicle_with_key(&db, "UNIT-002", "DEF-456", "K002").await;

    let loan = service::checkout(&db, driver.id, key_a.id, 5).await.unwrap();
    backdate_loan(&db, loan.id, 13).await;

    let overview = routes::overview(DbConnection(db.clone())).await.ok().unwrap().0;

    assert_eq!(overview.total_keys, 2);
    assert_eq!(overview.available_keys, 1);
    assert_eq!(overview.checked_out_keys, 1);
    assert_eq!(overview.maintenance_keys, 0);
    assert_eq!(overview.lost_keys, 0);
    assert_eq!(overview.active_loans, 1);
    assert_eq!(overview.overdue_loans, 1);
    assert_eq!(overview.staff_count, 2);
}

#[tokio::test]
async fn active_loans_are_most_recent_first_with_full_context() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;
    let (_, key_a) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;
    let (_, key_b) = seed_vehicle_with_key(&db, "UNIT-002", "DEF-456", "K002").await;

    let older = service::checkout(&db, driver.id, key_a.id, 5).await.unwrap();
    let newer = service::checkout(&db, driver.id, key_b.id, 5).await.unwrap();

    backdate_loan(&db, older.id, 2).await;

    let active = routes::active_loans(DbConnection(db.clone())).await.ok().unwrap().0;

    assert_eq!(active.len(), 2);
    assert_eq!(active[0].loan_id, newer.id);
    assert_eq!(active[1].loan_id, older.id);

    assert_eq!(active[0].key_number, "K002");
    assert_eq!(active[0].vehicle.unit_number, "UNIT-002");
    assert_eq!(active[0].holder.full_name, "Driver 5678");
    assert!(!active[0].is_overdue);
}

#[tokio::test]
async fn vehicle_usage_counts_completed_loans_per_vehicle() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;
    let (vehicle_a, key_a) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;
    let (vehicle_b, _) = seed_vehicle_with_key(&db, "UNIT-002", "DEF-456", "K002").await;

    for _ in 0..2 {
        let loan = service::checkout(&db, driver.id, key_a.id, 5).await.unwrap();
        service::checkin(&db, driver.id, loan.id, VehicleCondition::Good, None, 0)
            .await
            .unwrap();
    }

    let usage = routes::vehicle_usage(DbConnection(db.clone())).await.ok().unwrap().0;

    assert_eq!(usage.len(), 2);

    let by_unit = |unit: &str| {
        usage
            .iter()
            .find(|u| u.vehicle.unit_number == unit)
            .unwrap()
    };

    assert_eq!(by_unit("UNIT-001").vehicle.id, vehicle_a.id);
    assert_eq!(by_unit("UNIT-001").completed_loans, 2);
    // vehicles with no usage still show up with a zero count
    assert_eq!(by_unit("UNIT-002").vehicle.id, vehicle_b.id);
    assert_eq!(by_unit("UNIT-002").completed_loans, 0);
}

#[tokio::test]
async fn staff_usage_ranks_most_used_vehicles() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;
    let (_, key_a) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;
    let (_, key_b) = seed_vehicle_with_key(&db, "UNIT-002", "DEF-456", "K002").await;

    for _ in 0..2 {
        let loan = service::checkout(&db, driver.id, key_a.id, 5).await.unwrap();
        service::checkin(&db, driver.id, loan.id, VehicleCondition::Good, None, 0)
            .await
            .unwrap();
    }

    let loan = service::checkout(&db, driver.id, key_b.id, 5).await.unwrap();
    service::checkin(&db, driver.id, loan.id, VehicleCondition::Good, None, 0)
        .await
        .unwrap();

    let usage = routes::staff_usage(DbConnection(db.clone())).await.ok().unwrap().0;

    let driver_row = usage
        .iter()
        .find(|u| u.full_name == "Driver 5678")
        .expect("the driver should be on the report");

    assert_eq!(driver_row.completed_loans, 3);
    // both vehicles are Toyota Camry in the fixtures, so the single
    // aggregated name carries all three uses
    assert_eq!(driver_row.top_vehicles, vec![String::from("Toyota Camry (3)")]);
}

#[tokio::test]
async fn incident_list_only_contains_damaged_returns() {
    let db = test_db().await;

    let driver = seed_driver(&db, "5678").await;
    let (_, key_a) = seed_vehicle_with_key(&db, "UNIT-001", "ABC-123", "K001").await;
    let (_, key_b) = seed_vehicle_with_key(&db, "UNIT-002", "DEF-456", "K002").await;

    let clean = service::checkout(&db, driver.id, key_a.id, 5).await.unwrap();
    service::checkin(&db, driver.id, clean.id, VehicleCondition::Good, None, 0)
        .await
        .unwrap();

    let damaged = service::checkout(&db, driver.id, key_b.id, 5).await.unwrap();
    service::checkin(
        &db,
        driver.id,
        damaged.id,
        VehicleCondition::Accident,
        Some(String::from("collided with the depot gate, front left light broken")),
        0,
    )
    .await
    .unwrap();

    let incidents = routes::incidents(
        ValidatedQuery(Pagination::default()),
        DbConnection(db.clone()),
    )
    .await
    .ok()
    .unwrap()
    .0;

    assert_eq!(incidents.item_count, 1);
    assert_eq!(incidents.records.len(), 1);

    let incident = &incidents.records[0];
    assert_eq!(incident.loan_id, damaged.id);
    assert_eq!(incident.key_number, "K002");
    assert_eq!(incident.vehicle_condition, VehicleCondition::Accident);
    assert!(incident.incident_report.as_deref().unwrap().contains("depot gate"));
    assert!(incident.checkin_time.is_some());
}
