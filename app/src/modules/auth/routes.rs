use super::dto::{self, SessionDto, UserDto};
use super::middleware::RequestUser;
use super::session::{OptionalSessionId, SessionId};
use crate::modules::common::error_codes::{
    EMPLOYEE_ID_GENERATION, INVALID_CREDENTIALS, LICENSE_IN_USE,
};
use crate::modules::common::extractors::ValidatedJson;
use crate::modules::common::responses::{internal_error_msg, internal_error_res, SimpleError};
use crate::modules::common::validators::REGEX_IS_FOUR_DIGITS;
use crate::server::controller::AppState;
use axum::extract::Path;
use axum::headers::UserAgent;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router, TypedHeader,
};
use axum_client_ip::SecureClientIp;
use http::HeaderMap;
use shared::UserRole;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sign-out", post(sign_out))
        .route(
            "/sign-out/:public_session_id",
            delete(sign_out_session_by_id),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            super::middleware::require_user,
        ))
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
}

fn sign_in_or_up_response(
    user: UserDto,
    ses_token: SessionId,
) -> (HeaderMap, Json<dto::SignInResponse>) {
    let mut headers = HeaderMap::new();

    headers.insert("Set-Cookie", ses_token.into_set_cookie_header());

    (headers, Json(dto::SignInResponse { user }))
}

/// Signs in
///
/// Sign in with a role scoped identifier and PIN, dispatchers use their
/// dispatch id, drivers and cleaning staff the last 4 digits of their license
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    tag = "auth",
    request_body = SignIn,
    responses(
        (
            status = OK,
            description = "sign in successful",
            body = SignInResponse,
            headers(("Set-Cookie" = String, description = "new session id cookie"))
        ),
        (
            status = BAD_REQUEST,
            description = "invalid dto",
            body = SimpleError,
        ),
        (
            status = UNAUTHORIZED,
            description = "INVALID_CREDENTIALS, unknown identifier and wrong PIN are not distinguished",
            body = SimpleError,
        ),
    ),
)]
pub async fn sign_in(
    client_ip: SecureClientIp,
    old_session_token: OptionalSessionId,
    State(state): State<AppState>,
    TypedHeader(user_agent): TypedHeader<UserAgent>,
    ValidatedJson(payload): ValidatedJson<dto::SignIn>,
) -> Result<(HeaderMap, Json<dto::SignInResponse>), (StatusCode, SimpleError)> {
    use super::service::UserFromCredentialsError as Err;

    let identifier = payload.identifier.trim();

    if payload.role != UserRole::Dispatch && !REGEX_IS_FOUR_DIGITS.is_match(identifier) {
        return Err((
            StatusCode::BAD_REQUEST,
            SimpleError::from("license digits must be exactly 4 numbers"),
        ));
    }

    let user = state
        .auth_service
        .get_user_from_credentials(payload.role, identifier, payload.pin.trim())
        .await
        .map_err(|e| match e {
            Err::NotFound | Err::InvalidPin => (
                StatusCode::UNAUTHORIZED,
                SimpleError::from(INVALID_CREDENTIALS),
            ),
            Err::InternalError => internal_error_res(),
        })?;

    let session_token = state
        .auth_service
        .new_session(user.id, client_ip.0, user_agent.to_string())
        .await
        .or(Err(internal_error_msg("failed to create session")))?;

    if let Some(old_ses_token) = old_session_token.get_value() {
        state.auth_service.delete_session(&old_ses_token).await.ok();
    }

    Ok(sign_in_or_up_response(UserDto::from(user), session_token))
}

/// Signs up a new driver or cleaning staff member
///
/// creates the staff member with a generated employee id, returning it
/// and a new session cookie
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    tag = "auth",
    request_body = RegisterStaff,
    responses(
        (
            status = OK,
            description = "sign up successful",
            body = SignInResponse,
            headers(("Set-Cookie" = String, description = "new session id cookie"))
        ),
        (
            status = BAD_REQUEST,
            description = "invalid dto error message, or a role that cannot self register",
            body = SimpleError,
        ),
        (
            status = CONFLICT,
            description = "LICENSE_IN_USE error code, the license digits are taken",
            body = SimpleError,
        ),
    ),
)]
pub async fn sign_up(
    client_ip: SecureClientIp,
    State(state): State<AppState>,
    TypedHeader(user_agent): TypedHeader<UserAgent>,
    ValidatedJson(payload): ValidatedJson<dto::RegisterStaff>,
) -> Result<(HeaderMap, Json<dto::SignInResponse>), (StatusCode, SimpleError)> {
    use super::service::RegisterStaffError as Err;

    let created_user = state
        .auth_service
        .register_staff(payload)
        .await
        .map_err(|e| match e {
            Err::RoleNotAllowed => (
                StatusCode::BAD_REQUEST,
                SimpleError::from("only drivers and cleaning staff can self register"),
            ),
            Err::LicenseInUse => (StatusCode::CONFLICT, SimpleError::from(LICENSE_IN_USE)),
            Err::IdGeneration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                SimpleError::from(EMPLOYEE_ID_GENERATION),
            ),
            Err::Db(_) => internal_error_res(),
        })?;

    let session_token = state
        .auth_service
        .new_session(created_user.id, client_ip.0, user_agent.to_string())
        .await
        .or(Err(internal_error_msg("failed to create session")))?;

    Ok(sign_in_or_up_response(
        UserDto::from(created_user),
        session_token,
    ))
}

/// Signs out of the current user session
///
/// signs out by deleting the user session present in the sid (session id)
/// request cookie
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    tag = "auth",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            description = "sign out successful",
            headers(("Set-Cookie" = String, description = "expired cookie sid, so the client browser deletes the cookie"))
        ),
        (
            status = UNAUTHORIZED,
            description = "invalid session",
            body = SimpleError,
        ),
    ),
)]
pub async fn sign_out(
    Extension(session): Extension<SessionId>,
    State(state): State<AppState>,
) -> Result<(StatusCode, HeaderMap), (StatusCode, SimpleError)> {
    state
        .auth_service
        .delete_session(&session)
        .await
        .or(Err(internal_error_msg("failed to delete session")))?;

    let mut headers = HeaderMap::new();
    headers.insert("Set-Cookie", session.into_delete_cookie_header());

    Ok((StatusCode::OK, headers))
}

/// List all sessions for the request user
#[utoipa::path(
    get,
    path = "/auth/sessions",
    tag = "auth",
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            body = Vec<SessionDto>,
        ),
        (
            status = UNAUTHORIZED,
            description = "invalid session",
            body = SimpleError,
        ),
    ),
)]
pub async fn list_sessions(
    Extension(session): Extension<SessionId>,
    Extension(req_user): Extension<RequestUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionDto>>, (StatusCode, SimpleError)> {
    let current_session_id = session.get_id();

    let sessions = state
        .auth_service
        .get_active_user_sessions(req_user.0.id)
        .await
        .or(Err(internal_error_msg("failed to list sessions")))?
        .iter()
        .map(|s| {
            let mut session_dto = SessionDto::from(s.clone());

            let session_id = SessionId::from_database_value(s.session_token.clone())
                .expect("failed to convert session id from database value")
                .get_id();

            if current_session_id == session_id {
                session_dto.same_as_from_request = true
            }

            session_dto
        })
        .collect();

    Ok(Json(sessions))
}

/// Signs out of a session by its public id
///
/// deletes the user session with the provided public ID, a public id can be
/// found on any endpoint that list sessions
#[utoipa::path(
    delete,
    path = "/auth/sign-out/{public_session_id}",
    tag = "auth",
    params(
        ("public_session_id" = i32, Path, description = "public id of the session to delete"),
    ),
    security(("session_id" = [])),
    responses(
        (
            status = OK,
            description = "sign out successful",
            headers(("Set-Cookie" = String, description = "expired cookie sid, returned if the deleted session equals the request one"))
        ),
        (
            status = UNAUTHORIZED,
            description = "request does not contain a valid session or the session to be deleted does not belong to the user",
            body = SimpleError,
        ),
    ),
)]
pub async fn sign_out_session_by_id(
    Extension(req_user): Extension<RequestUser>,
    Extension(req_user_session): Extension<SessionId>,
    Path(public_session_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, HeaderMap), (StatusCode, SimpleError)> {
    let maybe_session_to_delete = state
        .auth_service
        .get_session_by_public_id(public_session_id)
        .await
        .or(Err(internal_error_res()))?;

    let session_to_delete = maybe_session_to_delete.ok_or((
        StatusCode::BAD_REQUEST,
        SimpleError::from("session does not exist"),
    ))?;

    if session_to_delete.user_id != req_user.0.id {
        return Err((
            StatusCode::UNAUTHORIZED,
            SimpleError::from("session does not belong to the request user"),
        ));
    }

    let session_to_delete_id = SessionId::from_database_value(session_to_delete.session_token)
        .expect("failed to convert session id from database value");

    state
        .auth_service
        .delete_session(&session_to_delete_id)
        .await
        .or(Err(internal_error_msg("failed to delete session")))?;

    let mut headers = HeaderMap::new();

    if req_user_session.get_id() == session_to_delete_id.get_id() {
        headers.insert(
            "Set-Cookie",
            session_to_delete_id.into_delete_cookie_header(),
        );
    }

    Ok((StatusCode::OK, headers))
}
