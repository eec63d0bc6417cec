use super::dto::{ListStaffDto, StaffMemberDto};
use crate::{
    database::error::DbError,
    modules::{
        auth::{
            self,
            dto::UserDto,
            middleware::{RequestUser, RoleLayer},
        },
        common::{
            dto::{Pagination, PaginationResult},
            extractors::{DbConnection, ValidatedQuery},
            responses::SimpleError,
        },
    },
    server::controller::AppState,
};
use axum::{routing::get, Extension, Json, Router};
use http::StatusCode;
use migration::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QueryTrait};
use shared::UserRole;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff))
        .layer(RoleLayer::new(vec![UserRole::Dispatch]))
        //
        .route("/me", get(me))
        //
        .layer(axum::middleware::from_fn_with_state(
            state,
            auth::middleware::require_user,
        ))
}

/// Returns the request user
///
/// the user is fetched from the session id cookie
#[utoipa::path(
    get,
    path = "/user/me",
    tag = "user",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            body = UserDto,
        ),
        (
            status = UNAUTHORIZED,
            description = "invalid session",
            body = SimpleError,
        ),
    ),
)]
pub async fn me(
    Extension(req_user): Extension<RequestUser>,
) -> Result<Json<UserDto>, (StatusCode, SimpleError)> {
    Ok(Json(req_user.0))
}

/// Lists the registered staff members
///
/// dispatch only, pin hashes are never exposed
#[utoipa::path(
    get,
    path = "/user",
    tag = "user",
    security(("session_id" = [])),
    params(
        Pagination,
        ListStaffDto
    ),
    responses(
        (
            status = OK,
            description = "paginated list of staff members",
            content_type = "application/json",
            body = PaginatedStaff,
        ),
        (
            status = FORBIDDEN,
            description = "caller is not a dispatcher",
            body = SimpleError,
        ),
    ),
)]
pub async fn list_staff(
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
    ValidatedQuery(filter): ValidatedQuery<ListStaffDto>,
    DbConnection(db): DbConnection,
) -> Result<Json<PaginationResult<StaffMemberDto>>, (StatusCode, SimpleError)> {
    let paginator = entity::user::Entity::find()
        .apply_if(filter.name, |query, name| {
            if name.is_empty() {
                query
            } else {
                let col = Expr::col((entity::user::Entity, entity::user::Column::FullName));
                query.filter(col.ilike(format!("%{}%", name)))
            }
        })
        .order_by_asc(entity::user::Column::FullName)
        .paginate(&db, pagination.page_size);

    let n = paginator
        .num_items_and_pages()
        .await
        .map_err(DbError::from)?;

    let records = paginator
        .fetch_page(pagination.page - 1)
        .await
        .map_err(DbError::from)?
        .into_iter()
        .map(StaffMemberDto::from)
        .collect();

    Ok(Json(PaginationResult {
        page: pagination.page,
        page_size: pagination.page_size,
        item_count: n.number_of_items,
        page_count: n.number_of_pages,
        records,
    }))
}
