#![allow(dead_code)]

use chrono::Utc;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema, Set,
};
use shared::{KeyStatus, UserRole, VehicleStatus};

use app::modules::auth::service::AuthService;

/// PIN of every staff member seeded by the fixtures below
pub const TEST_PIN: &str = "1234";

/// creates a fresh in memory sqlite database with the schema derived
/// from the entities
pub async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();

    let statements = vec![
        schema.create_table_from_entity(entity::user::Entity),
        schema.create_table_from_entity(entity::vehicle::Entity),
        schema.create_table_from_entity(entity::vehicle_key::Entity),
        schema.create_table_from_entity(entity::key_transaction::Entity),
        schema.create_table_from_entity(entity::session::Entity),
    ];

    for statement in statements {
        db.execute(backend.build(&statement)).await.unwrap();
    }

    db
}

pub fn auth_service(db: &DatabaseConnection) -> AuthService {
    AuthService::new(db.clone(), ChaCha8Rng::seed_from_u64(7))
}

/// hash with the lowest bcrypt cost (4) since we do not care about
/// the security of test data
fn hash_test_pin() -> String {
    bcrypt::hash(TEST_PIN, 4).unwrap()
}

pub async fn seed_staff(
    db: &DatabaseConnection,
    full_name: &str,
    role: UserRole,
    license_last4: Option<&str>,
    dispatch_id: Option<&str>,
) -> entity::user::Model {
    let discriminator = license_last4.or(dispatch_id).unwrap_or("0000");

    entity::user::ActiveModel {
        created_at: Set(Utc::now()),
        employee_id: Set(format!("{}{}", role.employee_id_prefix(), discriminator)),
        full_name: Set(full_name.to_owned()),
        role: Set(role),
        dispatch_id: Set(dispatch_id.map(str::to_owned)),
        license_last4: Set(license_last4.map(str::to_owned)),
        pin_hash: Set(hash_test_pin()),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_driver(db: &DatabaseConnection, license_last4: &str) -> entity::user::Model {
    seed_staff(
        db,
        &format!("Driver {}", license_last4),
        UserRole::Driver,
        Some(license_last4),
        None,
    )
    .await
}

pub async fn seed_dispatcher(db: &DatabaseConnection, dispatch_id: &str) -> entity::user::Model {
    seed_staff(
        db,
        &format!("Dispatcher {}", dispatch_id),
        UserRole::Dispatch,
        None,
        Some(dispatch_id),
    )
    .await
}

pub async fn seed_vehicle(
    db: &DatabaseConnection,
    unit_number: &str,
    plate_number: &str,
) -> entity::vehicle::Model {
    entity::vehicle::ActiveModel {
        created_at: Set(Utc::now()),
        unit_number: Set(unit_number.to_owned()),
        plate_number: Set(plate_number.to_owned()),
        vehicle_type: Set(String::from("Sedan")),
        brand: Set(String::from("Toyota")),
        model: Set(String::from("Camry")),
        year: Set(2023),
        color: Set(Some(String::from("Gray"))),
        additional_info: Set(None),
        status: Set(VehicleStatus::Available),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_key(
    db: &DatabaseConnection,
    vehicle_id: i32,
    key_number: &str,
) -> entity::vehicle_key::Model {
    entity::vehicle_key::ActiveModel {
        created_at: Set(Utc::now()),
        key_number: Set(key_number.to_owned()),
        vehicle_id: Set(vehicle_id),
        location: Set(String::from("Hook A1")),
        notes: Set(None),
        status: Set(KeyStatus::Available),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// seeds a vehicle with its key, returning both
pub async fn seed_vehicle_with_key(
    db: &DatabaseConnection,
    unit_number: &str,
    plate_number: &str,
    key_number: &str,
) -> (entity::vehicle::Model, entity::vehicle_key::Model) {
    let vehicle = seed_vehicle(db, unit_number, plate_number).await;
    let key = seed_key(db, vehicle.id, key_number).await;

    (vehicle, key)
}
