use super::dto::{CheckInDto, CheckOutDto, OpenLoanDto};
use super::service::{self, CheckinError, CheckoutError};
use crate::{
    config::app_config,
    database::error::DbError,
    modules::{
        auth::{
            self,
            middleware::{RequestUser, RoleLayer},
        },
        common::{
            error_codes::{
                ALREADY_CHECKED_IN, INCIDENT_REPORT_LENGTH, INCIDENT_REPORT_REQUIRED, KEY_IN_USE,
                KEY_NOT_AVAILABLE, LOAN_LIMIT_REACHED, NOT_LOAN_OWNER, RETURNED_TOO_SOON,
            },
            extractors::{DbConnection, ValidatedJson},
            responses::{internal_error_res, SimpleError},
        },
    },
    server::controller::AppState,
};
use axum::{
    extract::Path,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use http::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use shared::UserRole;
use std::collections::HashMap;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/check-out", post(check_out))
        .route("/:loan_id/check-in", post(check_in))
        .layer(RoleLayer::new(vec![
            UserRole::Driver,
            UserRole::CleaningStaff,
        ]))
        //
        .route("/mine", get(my_open_loans))
        //
        .layer(axum::middleware::from_fn_with_state(
            state,
            auth::middleware::require_user,
        ))
}

/// Checks out a key
///
/// drivers and cleaning staff only, the key must be AVAILABLE and the
/// caller below the open loan cap. On success the key becomes CHECKED_OUT
/// and the vehicle IN_USE, atomically with the ledger row creation.
#[utoipa::path(
    post,
    path = "/loan/check-out",
    tag = "loan",
    security(("session_id" = [])),
    request_body = CheckOutDto,
    responses(
        (
            status = OK,
            description = "the open loan",
            content_type = "application/json",
            body = entity::key_transaction::Model,
        ),
        (
            status = NOT_FOUND,
            description = "key not found",
            body = SimpleError,
        ),
        (
            status = CONFLICT,
            description = "KEY_NOT_AVAILABLE (with the current status) / KEY_IN_USE / LOAN_LIMIT_REACHED",
            body = SimpleError,
        ),
        (
            status = FORBIDDEN,
            description = "dispatchers do not hold keys",
            body = SimpleError,
        ),
    ),
)]
pub async fn check_out(
    Extension(req_user): Extension<RequestUser>,
    DbConnection(db): DbConnection,
    ValidatedJson(payload): ValidatedJson<CheckOutDto>,
) -> Result<Json<entity::key_transaction::Model>, (StatusCode, SimpleError)> {
    let loan = service::checkout(
        &db,
        req_user.0.id,
        payload.key_id,
        app_config().max_open_loans,
    )
    .await
    .map_err(|e| match e {
        CheckoutError::KeyNotFound => {
            (StatusCode::NOT_FOUND, SimpleError::from("key not found"))
        }
        CheckoutError::KeyNotAvailable(status) => (
            StatusCode::CONFLICT,
            SimpleError::from(format!(
                "{}: current status is {}",
                KEY_NOT_AVAILABLE, status
            )),
        ),
        CheckoutError::KeyInUse => (StatusCode::CONFLICT, SimpleError::from(KEY_IN_USE)),
        CheckoutError::LimitReached(cap) => (
            StatusCode::CONFLICT,
            SimpleError::from(format!("{}: at most {} open loans", LOAN_LIMIT_REACHED, cap)),
        ),
        CheckoutError::Db(_) => internal_error_res(),
    })?;

    Ok(Json(loan))
}

/// Returns a checked out key
///
/// only the staff member that checked the key out can return it, returning
/// with a condition other than GOOD requires an incident report and sends
/// the vehicle to MAINTENANCE.
#[utoipa::path(
    post,
    path = "/loan/{loan_id}/check-in",
    tag = "loan",
    security(("session_id" = [])),
    params(
        ("loan_id" = i32, Path, description = "id of the loan to close"),
    ),
    request_body = CheckInDto,
    responses(
        (
            status = OK,
            description = "the closed loan",
            content_type = "application/json",
            body = entity::key_transaction::Model,
        ),
        (
            status = NOT_FOUND,
            description = "loan not found",
            body = SimpleError,
        ),
        (
            status = FORBIDDEN,
            description = "NOT_LOAN_OWNER, the loan belongs to another staff member",
            body = SimpleError,
        ),
        (
            status = CONFLICT,
            description = "ALREADY_CHECKED_IN / RETURNED_TOO_SOON",
            body = SimpleError,
        ),
        (
            status = BAD_REQUEST,
            description = "INCIDENT_REPORT_REQUIRED / INCIDENT_REPORT_LENGTH",
            body = SimpleError,
        ),
    ),
)]
pub async fn check_in(
    Path(loan_id): Path<i32>,
    Extension(req_user): Extension<RequestUser>,
    DbConnection(db): DbConnection,
    ValidatedJson(payload): ValidatedJson<CheckInDto>,
) -> Result<Json<entity::key_transaction::Model>, (StatusCode, SimpleError)> {
    let loan = service::checkin(
        &db,
        req_user.0.id,
        loan_id,
        payload.vehicle_condition,
        payload.incident_report,
        app_config().min_loan_secs,
    )
    .await
    .map_err(|e| match e {
        CheckinError::LoanNotFound => {
            (StatusCode::NOT_FOUND, SimpleError::from("loan not found"))
        }
        CheckinError::NotLoanOwner => {
            (StatusCode::FORBIDDEN, SimpleError::from(NOT_LOAN_OWNER))
        }
        CheckinError::AlreadyCheckedIn => {
            (StatusCode::CONFLICT, SimpleError::from(ALREADY_CHECKED_IN))
        }
        CheckinError::ReturnedTooSoon(secs) => (
            StatusCode::CONFLICT,
            SimpleError::from(format!(
                "{}: hold the key for at least {} seconds",
                RETURNED_TOO_SOON, secs
            )),
        ),
        CheckinError::IncidentReportRequired => (
            StatusCode::BAD_REQUEST,
            SimpleError::from(INCIDENT_REPORT_REQUIRED),
        ),
        CheckinError::IncidentReportLength => (
            StatusCode::BAD_REQUEST,
            SimpleError::from(INCIDENT_REPORT_LENGTH),
        ),
        CheckinError::Db(_) => internal_error_res(),
    })?;

    Ok(Json(loan))
}

/// Lists the open loans of the request user
///
/// used by the return flow so staff can pick which key they are handing back
#[utoipa::path(
    get,
    path = "/loan/mine",
    tag = "loan",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            description = "open loans of the request user, most recent first",
            content_type = "application/json",
            body = Vec<OpenLoanDto>,
        ),
    ),
)]
pub async fn my_open_loans(
    Extension(req_user): Extension<RequestUser>,
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<OpenLoanDto>>, (StatusCode, SimpleError)> {
    let loans = service::open_loans_for_user(&db, req_user.0.id)
        .await
        .map_err(DbError::from)?;

    let key_ids: Vec<i32> = loans.iter().map(|l| l.key_id).collect();

    let keys_by_id: HashMap<i32, (entity::vehicle_key::Model, entity::vehicle::Model)> =
        entity::vehicle_key::Entity::find()
            .filter(entity::vehicle_key::Column::Id.is_in(key_ids))
            .find_also_related(entity::vehicle::Entity)
            .all(&db)
            .await
            .map_err(DbError::from)?
            .into_iter()
            .filter_map(|(key, vehicle)| vehicle.map(|v| (key.id, (key, v))))
            .collect();

    let now = Utc::now();

    let open_loans = loans
        .into_iter()
        .filter_map(|loan| {
            keys_by_id.get(&loan.key_id).map(|(key, vehicle)| OpenLoanDto {
                id: loan.id,
                key_number: key.key_number.clone(),
                location: key.location.clone(),
                unit_number: vehicle.unit_number.clone(),
                plate_number: vehicle.plate_number.clone(),
                brand: vehicle.brand.clone(),
                model: vehicle.model.clone(),
                checkout_time: loan.checkout_time,
                hours_out: (now - loan.checkout_time).num_hours(),
                is_overdue: service::is_overdue(loan.checkout_time, now),
            })
        })
        .collect();

    Ok(Json(open_loans))
}
