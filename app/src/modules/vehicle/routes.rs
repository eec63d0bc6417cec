use super::dto::{CreateVehicleDto, ListVehiclesDto};
use super::repository::{self, CreateVehicleError};
use crate::{
    database::{self, error::DbError},
    modules::{
        auth::{self, middleware::RoleLayer},
        common::{
            dto::{Pagination, PaginationResult},
            error_codes::{PLATE_IN_USE, UNIT_NUMBER_IN_USE},
            extractors::{DbConnection, ValidatedJson, ValidatedQuery},
            responses::{internal_error_res, SimpleError},
        },
    },
    server::controller::AppState,
};
use axum::{
    extract::Path,
    routing::{get, post},
    Json, Router,
};
use http::StatusCode;
use migration::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QueryTrait};
use shared::UserRole;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle))
        .route("/", get(list_vehicles))
        .route("/:vehicle_id", get(vehicle_by_id))
        .layer(RoleLayer::new(vec![UserRole::Dispatch]))
        .layer(axum::middleware::from_fn_with_state(
            state,
            auth::middleware::require_user,
        ))
}

/// Registers a new fleet vehicle
///
/// dispatch only, the vehicle starts on the AVAILABLE status
#[utoipa::path(
    post,
    path = "/vehicle",
    tag = "vehicle",
    security(("session_id" = [])),
    request_body = CreateVehicleDto,
    responses(
        (
            status = OK,
            description = "the created vehicle",
            content_type = "application/json",
            body = entity::vehicle::Model,
        ),
        (
            status = CONFLICT,
            description = "UNIT_NUMBER_IN_USE / PLATE_IN_USE error codes",
            body = SimpleError,
        ),
        (
            status = BAD_REQUEST,
            description = "invalid dto error message",
            body = SimpleError,
        ),
    ),
)]
pub async fn create_vehicle(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<CreateVehicleDto>,
) -> Result<Json<entity::vehicle::Model>, (StatusCode, SimpleError)> {
    let created_vehicle = repository::create_vehicle(&db, &dto)
        .await
        .map_err(|e| match e {
            CreateVehicleError::UnitNumberInUse => {
                (StatusCode::CONFLICT, SimpleError::from(UNIT_NUMBER_IN_USE))
            }
            CreateVehicleError::PlateInUse => {
                (StatusCode::CONFLICT, SimpleError::from(PLATE_IN_USE))
            }
            CreateVehicleError::Db(_) => internal_error_res(),
        })?;

    Ok(Json(created_vehicle))
}

/// Get a vehicle by ID
#[utoipa::path(
    get,
    tag = "vehicle",
    path = "/vehicle/{vehicle_id}",
    security(("session_id" = [])),
    params(
        ("vehicle_id" = i32, Path, description = "id of the vehicle"),
    ),
    responses(
        (
            status = OK,
            content_type = "application/json",
            body = entity::vehicle::Model,
        ),
        (
            status = NOT_FOUND,
            description = "vehicle not found",
            body = SimpleError,
        ),
    ),
)]
pub async fn vehicle_by_id(
    Path(vehicle_id): Path<i32>,
    DbConnection(db): DbConnection,
) -> Result<Json<entity::vehicle::Model>, (StatusCode, SimpleError)> {
    let vehicle = entity::vehicle::Entity::find_by_id(vehicle_id)
        .one(&db)
        .await
        .map_err(DbError::from)?
        .ok_or((
            StatusCode::NOT_FOUND,
            SimpleError::from("vehicle not found"),
        ))?;

    Ok(Json(vehicle))
}

/// Lists the fleet vehicles
#[utoipa::path(
    get,
    tag = "vehicle",
    path = "/vehicle",
    security(("session_id" = [])),
    params(
        Pagination,
        ListVehiclesDto
    ),
    responses(
        (
            status = OK,
            description = "paginated list of vehicles",
            content_type = "application/json",
            body = PaginatedVehicle,
        ),
    ),
)]
pub async fn list_vehicles(
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
    ValidatedQuery(filter): ValidatedQuery<ListVehiclesDto>,
    DbConnection(db): DbConnection,
) -> Result<Json<PaginationResult<entity::vehicle::Model>>, (StatusCode, SimpleError)> {
    let db_query = entity::vehicle::Entity::find()
        .apply_if(filter.plate, |query, plate| {
            if plate.is_empty() {
                query
            } else {
                let col = Expr::col((entity::vehicle::Entity, entity::vehicle::Column::PlateNumber));
                query.filter(col.ilike(format!("%{}%", plate)))
            }
        })
        .order_by_asc(entity::vehicle::Column::UnitNumber)
        .paginate(&db, pagination.page_size);

    let result = database::helpers::paginated_query_to_pagination_result(db_query, pagination)
        .await
        .map_err(DbError::from)?;

    Ok(Json(result))
}
