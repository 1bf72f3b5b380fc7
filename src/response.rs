//! Response helpers

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// `302 Found` redirect
///
/// `axum::response::Redirect` only offers 303, 307 and 308.
#[derive(Debug, Clone)]
pub struct Found(pub &'static str);

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        (
            StatusCode::FOUND,
            [(header::LOCATION, HeaderValue::from_static(self.0))],
        )
            .into_response()
    }
}

/// `302 Found` to an externally built URL
#[derive(Debug, Clone)]
pub struct FoundUrl(pub String);

impl IntoResponse for FoundUrl {
    fn into_response(self) -> Response {
        match HeaderValue::try_from(self.0) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(error) => crate::error::AppError::Internal(error.into()).into_response(),
        }
    }
}
