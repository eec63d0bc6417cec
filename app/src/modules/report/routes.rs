use super::dto::{
    ActiveLoanDto, FleetOverviewDto, HolderDto, IncidentDto, StaffUsageDto, VehicleSummaryDto,
    VehicleUsageDto,
};
use crate::{
    database::error::DbError,
    modules::{
        auth::{self, middleware::RoleLayer},
        common::{
            dto::{Pagination, PaginationResult},
            extractors::{DbConnection, ValidatedQuery},
            responses::SimpleError,
        },
        loan::service::is_overdue,
    },
    server::controller::AppState,
};
use axum::{routing::get, Json, Router};
use chrono::Utc;
use http::StatusCode;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use shared::{KeyStatus, TransactionStatus, UserRole, VehicleCondition};
use std::collections::HashMap;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/active-loans", get(active_loans))
        .route("/overdue", get(overdue_loans))
        .route("/vehicle-usage", get(vehicle_usage))
        .route("/staff-usage", get(staff_usage))
        .route("/incidents", get(incidents))
        .layer(RoleLayer::new(vec![UserRole::Dispatch]))
        .layer(axum::middleware::from_fn_with_state(
            state,
            auth::middleware::require_user,
        ))
}

/// fetches the key and vehicle of every loan in the slice, plus the staff
/// member that opened it, in three bulk queries
async fn loan_context(
    db: &DatabaseConnection,
    loans: &[entity::key_transaction::Model],
) -> Result<
    (
        HashMap<i32, (entity::vehicle_key::Model, entity::vehicle::Model)>,
        HashMap<i32, entity::user::Model>,
    ),
    DbErr,
> {
    let key_ids: Vec<i32> = loans.iter().map(|l| l.key_id).collect();
    let user_ids: Vec<i32> = loans.iter().map(|l| l.user_id).collect();

    let keys_by_id = entity::vehicle_key::Entity::find()
        .filter(entity::vehicle_key::Column::Id.is_in(key_ids))
        .find_also_related(entity::vehicle::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(key, vehicle)| vehicle.map(|v| (key.id, (key, v))))
        .collect();

    let users_by_id = entity::user::Entity::find()
        .filter(entity::user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok((keys_by_id, users_by_id))
}

async fn fetch_active_loans(db: &DatabaseConnection) -> Result<Vec<ActiveLoanDto>, DbErr> {
    let loans = entity::key_transaction::Entity::find()
        .filter(entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedOut))
        .order_by_desc(entity::key_transaction::Column::CheckoutTime)
        .all(db)
        .await?;

    let (keys_by_id, users_by_id) = loan_context(db, &loans).await?;

    let now = Utc::now();

    let dtos = loans
        .into_iter()
        .filter_map(|loan| {
            let (key, vehicle) = keys_by_id.get(&loan.key_id)?;
            let holder = users_by_id.get(&loan.user_id)?;

            Some(ActiveLoanDto {
                loan_id: loan.id,
                key_number: key.key_number.clone(),
                location: key.location.clone(),
                vehicle: VehicleSummaryDto::from(vehicle),
                holder: HolderDto::from(holder),
                checkout_time: loan.checkout_time,
                hours_out: (now - loan.checkout_time).num_hours(),
                is_overdue: is_overdue(loan.checkout_time, now),
            })
        })
        .collect();

    Ok(dtos)
}

/// Fleet wide counters
#[utoipa::path(
    get,
    path = "/report/overview",
    tag = "report",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            content_type = "application/json",
            body = FleetOverviewDto,
        ),
        (
            status = FORBIDDEN,
            description = "caller is not a dispatcher",
            body = SimpleError,
        ),
    ),
)]
pub async fn overview(
    DbConnection(db): DbConnection,
) -> Result<Json<FleetOverviewDto>, (StatusCode, SimpleError)> {
    let count_keys_with_status = |status: KeyStatus| {
        entity::vehicle_key::Entity::find()
            .filter(entity::vehicle_key::Column::Status.eq(status))
            .count(&db)
    };

    let total_keys = entity::vehicle_key::Entity::find()
        .count(&db)
        .await
        .map_err(DbError::from)?;

    let available_keys = count_keys_with_status(KeyStatus::Available)
        .await
        .map_err(DbError::from)?;

    let checked_out_keys = count_keys_with_status(KeyStatus::CheckedOut)
        .await
        .map_err(DbError::from)?;

    let maintenance_keys = count_keys_with_status(KeyStatus::Maintenance)
        .await
        .map_err(DbError::from)?;

    let lost_keys = count_keys_with_status(KeyStatus::Lost)
        .await
        .map_err(DbError::from)?;

    let staff_count = entity::user::Entity::find()
        .count(&db)
        .await
        .map_err(DbError::from)?;

    let open_loans = entity::key_transaction::Entity::find()
        .filter(entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedOut))
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let now = Utc::now();

    let overdue_loans = open_loans
        .iter()
        .filter(|l| is_overdue(l.checkout_time, now))
        .count() as u64;

    Ok(Json(FleetOverviewDto {
        total_keys,
        available_keys,
        checked_out_keys,
        maintenance_keys,
        lost_keys,
        active_loans: open_loans.len() as u64,
        overdue_loans,
        staff_count,
    }))
}

/// Open loans, most recent checkout first
#[utoipa::path(
    get,
    path = "/report/active-loans",
    tag = "report",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            content_type = "application/json",
            body = Vec<ActiveLoanDto>,
        ),
    ),
)]
pub async fn active_loans(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<ActiveLoanDto>>, (StatusCode, SimpleError)> {
    let loans = fetch_active_loans(&db).await.map_err(DbError::from)?;

    Ok(Json(loans))
}

/// The overdue subset of the open loans
///
/// an open loan is overdue once the key has been out for more than 12 hours
#[utoipa::path(
    get,
    path = "/report/overdue",
    tag = "report",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            content_type = "application/json",
            body = Vec<ActiveLoanDto>,
        ),
    ),
)]
pub async fn overdue_loans(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<ActiveLoanDto>>, (StatusCode, SimpleError)> {
    let loans = fetch_active_loans(&db).await.map_err(DbError::from)?;

    Ok(Json(loans.into_iter().filter(|l| l.is_overdue).collect()))
}

/// Completed loan count per fleet vehicle
#[utoipa::path(
    get,
    path = "/report/vehicle-usage",
    tag = "report",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            content_type = "application/json",
            body = Vec<VehicleUsageDto>,
        ),
    ),
)]
pub async fn vehicle_usage(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<VehicleUsageDto>>, (StatusCode, SimpleError)> {
    let vehicles = entity::vehicle::Entity::find()
        .order_by_asc(entity::vehicle::Column::UnitNumber)
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let closed_loans = entity::key_transaction::Entity::find()
        .filter(entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedIn))
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let keys = entity::vehicle_key::Entity::find()
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let vehicle_by_key_id: HashMap<i32, i32> =
        keys.iter().map(|k| (k.id, k.vehicle_id)).collect();

    let mut uses_by_vehicle_id: HashMap<i32, u64> = HashMap::new();

    for loan in &closed_loans {
        if let Some(vehicle_id) = vehicle_by_key_id.get(&loan.key_id) {
            *uses_by_vehicle_id.entry(*vehicle_id).or_insert(0) += 1;
        }
    }

    let report = vehicles
        .into_iter()
        .map(|vehicle| {
            let completed_loans = uses_by_vehicle_id.get(&vehicle.id).copied().unwrap_or(0);

            VehicleUsageDto {
                vehicle,
                completed_loans,
            }
        })
        .collect();

    Ok(Json(report))
}

/// Completed loan count and most used vehicles per staff member
#[utoipa::path(
    get,
    path = "/report/staff-usage",
    tag = "report",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            content_type = "application/json",
            body = Vec<StaffUsageDto>,
        ),
    ),
)]
pub async fn staff_usage(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<StaffUsageDto>>, (StatusCode, SimpleError)> {
    let staff = entity::user::Entity::find()
        .order_by_asc(entity::user::Column::FullName)
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let closed_loans = entity::key_transaction::Entity::find()
        .filter(entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedIn))
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let keys = entity::vehicle_key::Entity::find()
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let vehicles = entity::vehicle::Entity::find()
        .all(&db)
        .await
        .map_err(DbError::from)?;

    let vehicle_by_id: HashMap<i32, &entity::vehicle::Model> =
        vehicles.iter().map(|v| (v.id, v)).collect();

    let vehicle_id_by_key_id: HashMap<i32, i32> =
        keys.iter().map(|k| (k.id, k.vehicle_id)).collect();

    let report = staff
        .into_iter()
        .map(|member| {
            let member_loans: Vec<_> = closed_loans
                .iter()
                .filter(|l| l.user_id == member.id)
                .collect();

            let mut uses_by_vehicle_name: HashMap<String, u64> = HashMap::new();

            for loan in &member_loans {
                let vehicle_name = vehicle_id_by_key_id
                    .get(&loan.key_id)
                    .and_then(|vehicle_id| vehicle_by_id.get(vehicle_id))
                    .map(|v| format!("{} {}", v.brand, v.model));

                if let Some(name) = vehicle_name {
                    *uses_by_vehicle_name.entry(name).or_insert(0) += 1;
                }
            }

            let mut usage: Vec<(String, u64)> = uses_by_vehicle_name.into_iter().collect();
            usage.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

            let top_vehicles = usage
                .into_iter()
                .take(2)
                .map(|(name, uses)| format!("{} ({})", name, uses))
                .collect();

            StaffUsageDto {
                full_name: member.full_name,
                employee_id: member.employee_id,
                role: member.role,
                license_last4: member.license_last4,
                completed_loans: member_loans.len() as u64,
                top_vehicles,
            }
        })
        .collect();

    Ok(Json(report))
}

/// Closed loans returned with a vehicle condition other than GOOD
#[utoipa::path(
    get,
    path = "/report/incidents",
    tag = "report",
    security(("session_id" = [])),
    params(Pagination),
    responses(
        (
            status = OK,
            description = "paginated incident list, most recent check-in first",
            content_type = "application/json",
            body = PaginatedIncident,
        ),
    ),
)]
pub async fn incidents(
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
    DbConnection(db): DbConnection,
) -> Result<Json<PaginationResult<IncidentDto>>, (StatusCode, SimpleError)> {
    let paginator = entity::key_transaction::Entity::find()
        .filter(entity::key_transaction::Column::Status.eq(TransactionStatus::CheckedIn))
        .filter(entity::key_transaction::Column::VehicleCondition.ne(VehicleCondition::Good))
        .order_by_desc(entity::key_transaction::Column::CheckinTime)
        .paginate(&db, pagination.page_size);

    let n = paginator
        .num_items_and_pages()
        .await
        .map_err(DbError::from)?;

    let incident_loans = paginator
        .fetch_page(pagination.page - 1)
        .await
        .map_err(DbError::from)?;

    let (keys_by_id, users_by_id) = loan_context(&db, &incident_loans)
        .await
        .map_err(DbError::from)?;

    let records = incident_loans
        .into_iter()
        .filter_map(|loan| {
            let (key, vehicle) = keys_by_id.get(&loan.key_id)?;
            let reported_by = users_by_id.get(&loan.user_id)?;

            Some(IncidentDto {
                loan_id: loan.id,
                key_number: key.key_number.clone(),
                vehicle: VehicleSummaryDto::from(vehicle),
                reported_by: HolderDto::from(reported_by),
                vehicle_condition: loan.vehicle_condition?,
                incident_report: loan.incident_report,
                checkin_time: loan.checkin_time,
            })
        })
        .collect();

    Ok(Json(PaginationResult {
        page: pagination.page,
        page_size: pagination.page_size,
        item_count: n.number_of_items,
        page_count: n.number_of_pages,
        records,
    }))
}
