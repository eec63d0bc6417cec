use super::dto::UserDto;
use crate::{
    modules::common::{
        error_codes::{INVALID_SESSION, NO_SID_COOKIE, ROLE_NOT_ALLOWED},
        responses::{internal_error_msg, SimpleError},
    },
    server::controller::AppState,
};
use axum::{
    body::Body,
    extract::State,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use http::{Request, StatusCode};
use shared::UserRole;
use std::convert::Infallible;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::session::{get_session_id_from_request_headers, SessionId};

/// The user that originated the request, extracted from its session cookie
#[derive(Clone)]
pub struct RequestUser(pub UserDto);

/// middleware for routes that require a logged in user, this queries the DB to get
/// the request user by his session ID cookie, so use it only within routes that need
/// the user data, adds the following extensions:
///
/// - `SessionId`
/// - `RequestUser`
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next<Body>,
) -> Result<Response, (StatusCode, SimpleError)> {
    if let Some(session_id) = get_session_id_from_request_headers(req.headers()) {
        let session_token = SessionId::from(session_id);

        let maybe_user = state
            .auth_service
            .get_user_from_session_id(session_token)
            .await
            .or(Err(internal_error_msg("failed to fetch user session")))?;

        let user = maybe_user
            .ok_or((StatusCode::UNAUTHORIZED, SimpleError::from(INVALID_SESSION)))?;

        req.extensions_mut().insert(session_token);
        req.extensions_mut().insert(RequestUser(UserDto::from(user)));

        return Ok(next.run(req).await);
    }

    Err((StatusCode::UNAUTHORIZED, SimpleError::from(NO_SID_COOKIE)))
}

/// A layer to be used as a middleware to authorize users by their role.
///
/// this requires the `RequestUser` extension to be available for the route
/// its protecting, otherwise the request will always fail since there is no
/// user to check the role of.
#[derive(Clone)]
pub struct RoleLayer {
    /// roles that are allowed through
    allowed_roles: Vec<UserRole>,
}

impl RoleLayer {
    pub fn new(allowed_roles: Vec<UserRole>) -> Self {
        RoleLayer { allowed_roles }
    }
}

impl<S> Layer<S> for RoleLayer {
    type Service = RoleMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleMiddleware {
            inner,
            allowed_roles: self.allowed_roles.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RoleMiddleware<S> {
    /// inner service to execute, normally the next middleware or the final route handler
    inner: S,
    allowed_roles: Vec<UserRole>,
}

impl<S> Service<Request<Body>> for RoleMiddleware<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let maybe_not_ready_inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, maybe_not_ready_inner);

        if let Some(req_user) = req.extensions().get::<RequestUser>() {
            let role_is_allowed = self.allowed_roles.contains(&req_user.0.role);

            return Box::pin(async move {
                if role_is_allowed {
                    return inner.call(req).await;
                }

                let err = (StatusCode::FORBIDDEN, SimpleError::from(ROLE_NOT_ALLOWED));
                Ok(err.into_response())
            });
        }

        Box::pin(async {
            let response = internal_error_msg("cannot check user role").into_response();
            Ok(response)
        })
    }
}
