use super::dto::{KeySearchResultDto, ListKeysDto, RegisterKeyDto, SearchKeyDto};
use super::repository::{self, RegisterKeyError, SearchKeyError};
use crate::{
    database::{self, error::DbError},
    modules::{
        auth::{
            self,
            middleware::{RequestUser, RoleLayer},
        },
        common::{
            dto::{Pagination, PaginationResult},
            error_codes::{KEY_NOT_AVAILABLE, KEY_NUMBER_IN_USE, VEHICLE_ALREADY_HAS_KEY},
            extractors::{DbConnection, ValidatedJson, ValidatedQuery},
            responses::{internal_error_res, SimpleError},
        },
    },
    server::controller::AppState,
};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use http::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QueryTrait};
use shared::UserRole;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(register_key))
        .route("/", get(list_keys))
        .layer(RoleLayer::new(vec![UserRole::Dispatch]))
        //
        .route("/search", get(search_key))
        //
        .layer(axum::middleware::from_fn_with_state(
            state,
            auth::middleware::require_user,
        ))
}

/// Registers a physical key for a vehicle
///
/// dispatch only, the key number is normalized to uppercase and must be
/// unique, a vehicle can only have a single key
#[utoipa::path(
    post,
    path = "/key",
    tag = "key",
    security(("session_id" = [])),
    request_body = RegisterKeyDto,
    responses(
        (
            status = OK,
            description = "the registered key",
            content_type = "application/json",
            body = entity::vehicle_key::Model,
        ),
        (
            status = CONFLICT,
            description = "KEY_NUMBER_IN_USE / VEHICLE_ALREADY_HAS_KEY error codes",
            body = SimpleError,
        ),
        (
            status = NOT_FOUND,
            description = "vehicle not found",
            body = SimpleError,
        ),
    ),
)]
pub async fn register_key(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<RegisterKeyDto>,
) -> Result<Json<entity::vehicle_key::Model>, (StatusCode, SimpleError)> {
    let created_key = repository::register_key(&db, dto)
        .await
        .map_err(|e| match e {
            RegisterKeyError::KeyNumberInUse => {
                (StatusCode::CONFLICT, SimpleError::from(KEY_NUMBER_IN_USE))
            }
            RegisterKeyError::VehicleNotFound => (
                StatusCode::NOT_FOUND,
                SimpleError::from("vehicle not found"),
            ),
            RegisterKeyError::VehicleAlreadyHasKey => (
                StatusCode::CONFLICT,
                SimpleError::from(VEHICLE_ALREADY_HAS_KEY),
            ),
            RegisterKeyError::Db(_) => internal_error_res(),
        })?;

    Ok(Json(created_key))
}

/// Lists the registered keys
#[utoipa::path(
    get,
    path = "/key",
    tag = "key",
    security(("session_id" = [])),
    params(
        Pagination,
        ListKeysDto
    ),
    responses(
        (
            status = OK,
            description = "paginated list of keys",
            content_type = "application/json",
            body = PaginatedVehicleKey,
        ),
    ),
)]
pub async fn list_keys(
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
    ValidatedQuery(filter): ValidatedQuery<ListKeysDto>,
    DbConnection(db): DbConnection,
) -> Result<Json<PaginationResult<entity::vehicle_key::Model>>, (StatusCode, SimpleError)> {
    let db_query = entity::vehicle_key::Entity::find()
        .apply_if(filter.status, |query, status| {
            query.filter(entity::vehicle_key::Column::Status.eq(status))
        })
        .order_by_asc(entity::vehicle_key::Column::KeyNumber)
        .paginate(&db, pagination.page_size);

    let result = database::helpers::paginated_query_to_pagination_result(db_query, pagination)
        .await
        .map_err(DbError::from)?;

    Ok(Json(result))
}

/// Searches a key by the number printed on its tag
///
/// the match is case insensitive and exact, the result tells the caller
/// whether the key is available, held by themselves (and can be returned)
/// or held by someone else
#[utoipa::path(
    get,
    path = "/key/search",
    tag = "key",
    security(("session_id" = [])),
    params(SearchKeyDto),
    responses(
        (
            status = OK,
            description = "the key, its vehicle and its availability relative to the caller",
            content_type = "application/json",
            body = KeySearchResultDto,
        ),
        (
            status = NOT_FOUND,
            description = "no key found with this number",
            body = SimpleError,
        ),
        (
            status = CONFLICT,
            description = "KEY_NOT_AVAILABLE, the key is on maintenance or lost",
            body = SimpleError,
        ),
    ),
)]
pub async fn search_key(
    Extension(req_user): Extension<RequestUser>,
    DbConnection(db): DbConnection,
    ValidatedQuery(query): ValidatedQuery<SearchKeyDto>,
) -> Result<Json<KeySearchResultDto>, (StatusCode, SimpleError)> {
    let result = repository::search_by_number(&db, &query.number, req_user.0.id)
        .await
        .map_err(|e| match e {
            SearchKeyError::NotFound => (
                StatusCode::NOT_FOUND,
                SimpleError::from("no key found with this number"),
            ),
            SearchKeyError::NotAvailable(status) => (
                StatusCode::CONFLICT,
                SimpleError::from(format!("{}: current status is {}", KEY_NOT_AVAILABLE, status)),
            ),
            SearchKeyError::Db(_) => internal_error_res(),
        })?;

    Ok(Json(result))
}
