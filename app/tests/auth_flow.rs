//! Tests for registration, credential verification and session resolution.

mod common;

use app::modules::auth::dto::RegisterStaff;
use app::modules::auth::service::{RegisterStaffError, UserFromCredentialsError};
use chrono::{Duration, Utc};
use common::*;
use migration::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use shared::UserRole;
use std::net::{IpAddr, Ipv4Addr};

fn register_dto(full_name: &str, license_last4: &str, role: UserRole, pin: &str) -> RegisterStaff {
    RegisterStaff {
        full_name: full_name.to_owned(),
        license_last4: license_last4.to_owned(),
        role,
        pin: pin.to_owned(),
    }
}

fn localhost() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

#[tokio::test]
async fn registered_driver_can_sign_in() {
    let db = test_db().await;
    let service = auth_service(&db);

    let created = service
        .register_staff(register_dto("Juan Perez", "1234", UserRole::Driver, "1234"))
        .await
        .expect("registration should succeed");

    assert_eq!(created.role, UserRole::Driver);
    assert_eq!(created.license_last4.as_deref(), Some("1234"));
    assert!(created.employee_id.starts_with("DRV1234"));
    assert_eq!(created.employee_id.len(), 11);
    // the PIN must never be stored in plain text
    assert_ne!(created.pin_hash, "1234");

    let user = service
        .get_user_from_credentials(UserRole::Driver, "1234", "1234")
        .await
        .ok()
        .expect("sign in with the registered credentials should succeed");

    assert_eq!(user.id, created.id);
}

#[tokio::test]
async fn wrong_pin_and_unknown_identifier_are_indistinguishable() {
    let db = test_db().await;
    let service = auth_service(&db);

    seed_driver(&db, "5678").await;

    let wrong_pin = service
        .get_user_from_credentials(UserRole::Driver, "5678", "0000")
        .await;

    let unknown = service
        .get_user_from_credentials(UserRole::Driver, "9999", "0000")
        .await;

    // both fail, the distinction lives only inside the service so the
    // route layer can map them onto the same INVALID_CREDENTIALS response
    assert!(matches!(
        wrong_pin,
        Err(UserFromCredentialsError::InvalidPin)
    ));
    assert!(matches!(unknown, Err(UserFromCredentialsError::NotFound)));
}

#[tokio::test]
async fn dispatcher_signs_in_by_dispatch_id() {
    let db = test_db().await;
    let service = auth_service(&db);

    let dispatcher = seed_dispatcher(&db, "0001").await;

    let found = service
        .get_user_from_credentials(UserRole::Dispatch, "0001", TEST_PIN)
        .await
        .ok()
        .expect("dispatch sign in should succeed");

    assert_eq!(found.id, dispatcher.id);

    // a driver identifier never matches the dispatch scope
    let cross_scope = service
        .get_user_from_credentials(UserRole::Dispatch, "5678", TEST_PIN)
        .await;
    assert!(matches!(
        cross_scope,
        Err(UserFromCredentialsError::NotFound)
    ));
}

#[tokio::test]
async fn crew_login_scope_covers_drivers_and_cleaning_staff() {
    let db = test_db().await;
    let service = auth_service(&db);

    seed_staff(
        &db,
        "Carlos Rodriguez",
        UserRole::CleaningStaff,
        Some("3344"),
        None,
    )
    .await;

    let found = service
        .get_user_from_credentials(UserRole::Driver, "3344", TEST_PIN)
        .await
        .ok()
        .expect("cleaning staff can sign in through the crew scope");

    assert_eq!(found.role, UserRole::CleaningStaff);
}

#[tokio::test]
async fn inactive_users_cannot_sign_in() {
    let db = test_db().await;
    let service = auth_service(&db);

    let driver = seed_driver(&db, "5678").await;

    entity::user::Entity::update_many()
        .col_expr(entity::user::Column::IsActive, Expr::value(false))
        .filter(entity::user::Column::Id.eq(driver.id))
        .exec(&db)
        .await
        .unwrap();

    let result = service
        .get_user_from_credentials(UserRole::Driver, "5678", TEST_PIN)
        .await;

    assert!(matches!(result, Err(UserFromCredentialsError::NotFound)));
}

#[tokio::test]
async fn duplicate_license_registration_is_rejected() {
    let db = test_db().await;
    let service = auth_service(&db);

    service
        .register_staff(register_dto("Juan Perez", "1234", UserRole::Driver, "1234"))
        .await
        .unwrap();

    let duplicate = service
        .register_staff(register_dto(
            "Maria Gonzalez",
            "1234",
            UserRole::CleaningStaff,
            "5678",
        ))
        .await;

    assert!(matches!(duplicate, Err(RegisterStaffError::LicenseInUse)));
}

#[tokio::test]
async fn dispatch_cannot_self_register() {
    let db = test_db().await;
    let service = auth_service(&db);

    let result = service
        .register_staff(register_dto(
            "Dispatch Central",
            "0000",
            UserRole::Dispatch,
            "0000",
        ))
        .await;

    assert!(matches!(result, Err(RegisterStaffError::RoleNotAllowed)));
}

#[tokio::test]
async fn session_resolves_to_its_user_until_expired() {
    let db = test_db().await;
    let service = auth_service(&db);

    let driver = seed_driver(&db, "5678").await;

    let token = service
        .new_session(driver.id, localhost(), String::from("test-agent"))
        .await
        .expect("session creation should succeed");

    let resolved = service
        .get_user_from_session_id(token)
        .await
        .unwrap()
        .expect("fresh session should resolve");
    assert_eq!(resolved.id, driver.id);

    // force the session past its 8 hour expiry
    entity::session::Entity::update_many()
        .col_expr(
            entity::session::Column::ExpiresAt,
            Expr::value(Utc::now() - Duration::minutes(1)),
        )
        .filter(entity::session::Column::UserId.eq(driver.id))
        .exec(&db)
        .await
        .unwrap();

    let expired = service.get_user_from_session_id(token).await.unwrap();
    assert!(expired.is_none());
}

#[tokio::test]
async fn unknown_and_deleted_sessions_resolve_to_none() {
    let db = test_db().await;
    let service = auth_service(&db);

    let driver = seed_driver(&db, "5678").await;

    let unknown = service
        .get_user_from_session_id(app::modules::auth::session::SessionId::from(123456789u128))
        .await
        .unwrap();
    assert!(unknown.is_none());

    let token = service
        .new_session(driver.id, localhost(), String::from("test-agent"))
        .await
        .unwrap();

    service.delete_session(&token).await.unwrap();

    let deleted = service.get_user_from_session_id(token).await.unwrap();
    assert!(deleted.is_none());
}

#[tokio::test]
async fn sessions_are_listed_while_active() {
    let db = test_db().await;
    let service = auth_service(&db);

    let driver = seed_driver(&db, "5678").await;

    service
        .new_session(driver.id, localhost(), String::from("agent-a"))
        .await
        .unwrap();
    service
        .new_session(driver.id, localhost(), String::from("agent-b"))
        .await
        .unwrap();

    let sessions = service.get_active_user_sessions(driver.id).await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.expires_at > Utc::now()));
}
