//! Error types for Octogate
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// Each variant maps to one HTTP status code and a JSON body of the
/// form `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// OAuth state cookie missing or not matching the callback (401)
    #[error("Invalid OAuth state")]
    InvalidState,

    /// OAuth provider rejected the exchange or returned garbage (502)
    #[error("Upstream authentication failed: {0}")]
    Upstream(String),

    /// HTTP client error while talking to the provider (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Signing error (500)
    #[error("Signing error: {0}")]
    Signing(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Short machine-readable label, used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound => "not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::InvalidState => "invalid_state",
            AppError::Upstream(_) => "upstream_auth",
            AppError::HttpClient(_) => "http_client",
            AppError::Database(_) => "database",
            AppError::Config(_) => "config",
            AppError::Signing(_) => "signing",
            AppError::Internal(_) => "internal",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized | AppError::InvalidState => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Signing(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Server-side failures only expose a generic message; the details
    /// go to the log.
    fn into_response(self) -> Response {
        use axum::Json;

        let status = self.status();
        let error_message = match &self {
            AppError::Database(_) => "Database error".to_string(),
            AppError::Config(_) => "Server misconfigured".to_string(),
            AppError::Signing(_) | AppError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
        } else {
            tracing::debug!(error = %self, kind = self.kind(), "Request rejected");
        }

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[self.kind()])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
