//! Authentication guard
//!
//! Protects routes that require a logged-in user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use super::session::SESSION_COOKIE;
use crate::AppState;
use crate::error::AppError;
use crate::response::Found;

/// Extractor for the authenticated user id
///
/// Reads the `session_id` cookie and resolves it against the session
/// store on every request.
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(user_id): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let session_id = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let user_id = state
            .sessions
            .resolve(session_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser(user_id))
    }
}

/// Middleware for browser pages: turn 401 into a redirect to `/`
///
/// # Usage
/// ```ignore
/// let app_routes = Router::new()
///     .route("/app", get(dashboard))
///     .route_layer(middleware::from_fn(redirect_unauthorized));
/// ```
pub async fn redirect_unauthorized(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.status() == StatusCode::UNAUTHORIZED {
        return Found("/").into_response();
    }

    response
}
