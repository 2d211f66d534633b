//! Error handling module for the site backend.
//!
//! Every failure is caught at the handler boundary and mapped to an HTTP status
//! plus a JSON body. Upstream failures (store, mail, file storage) keep their
//! underlying detail out of the body unless the server runs in development mode.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::Environment;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_ID: &str = "INVALID_ID";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const MAIL_ERROR: &str = "MAIL_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired credential
    Unauthorized(String),
    /// Identifier resolves to nothing
    NotFound(String),
    /// Identifier is not a well-formed key
    InvalidId(String),
    /// Missing or malformed required fields
    Validation(String),
    /// Write rejected by a uniqueness constraint
    Conflict(String),
    /// Document store failure
    Database(String),
    /// Outbound mail failure
    Mail(String),
    /// Transient file storage failure
    Storage(String),
    /// Anything else
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::InvalidId(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Mail(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::InvalidId(_) => codes::INVALID_ID,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Mail(_) => codes::MAIL_ERROR,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the client-facing message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidId(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Database(_) => "Server error".to_string(),
            AppError::Mail(_) => "Failed to send message.".to_string(),
            AppError::Storage(_) => "Failed to store upload".to_string(),
            AppError::Internal(_) => "Something went wrong!".to_string(),
        }
    }

    /// Underlying upstream detail, only present for 5xx errors.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::Database(detail)
            | AppError::Mail(detail)
            | AppError::Storage(detail)
            | AppError::Internal(detail) => Some(detail),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.error_code(), detail),
            None => write!(f, "{}: {}", self.error_code(), self.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            message: error.message(),
            code: error.error_code().to_string(),
            error: None,
        }
    }
}

/// Detailed body stashed in response extensions for 5xx errors.
#[derive(Debug, Clone)]
struct ErrorDetail(ErrorResponse);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        let detail = self.detail().map(|detail| ErrorResponse {
            error: Some(detail.to_string()),
            ..body.clone()
        });

        let mut response = (status, Json(body)).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

/// Rewrites 5xx bodies to include the upstream detail outside production.
pub async fn expose_error_detail(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if environment.is_production() {
        return response;
    }

    match response.extensions_mut().remove::<ErrorDetail>() {
        Some(ErrorDetail(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}

/// Last-resort response for a panicking handler.
pub fn panic_response(
    panic: Box<dyn std::any::Any + Send + 'static>,
    environment: Environment,
) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    let body = ErrorResponse {
        message: "Something went wrong!".to_string(),
        code: codes::INTERNAL_ERROR.to_string(),
        error: (!environment.is_production()).then_some(detail),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
