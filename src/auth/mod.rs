//! Request authentication.
//!
//! The access gate extracts an `Authorization: Bearer <token>` credential,
//! verifies it and attaches the decoded claims to the request. Rejected
//! requests never reach the handler.

mod token;

pub use token::*;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::config::AdminCredentials;
use crate::errors::AppError;

/// Subject id of the configured admin identity.
pub const ADMIN_SUBJECT: &str = "admin";

const BEARER_PREFIX: &str = "Bearer ";
const NO_TOKEN: &str = "No token, authorization denied";

/// Access gate for create/update/delete routes.
pub async fn require_auth(
    State(keys): State<Arc<TokenKeys>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token.to_string(),
        Err(e) => return e.into_response(),
    };

    match keys.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(kind) => {
            tracing::debug!(reason = %kind, "Rejected bearer credential");
            AppError::Unauthorized(kind.message().to_string()).into_response()
        }
    }
}

/// Extract the bearer credential from the request headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Token is not valid".to_string()))?
        .trim();

    if value.is_empty() || value == BEARER_PREFIX.trim_end() {
        return Err(AppError::Unauthorized(NO_TOKEN.to_string()));
    }

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err(AppError::Unauthorized(NO_TOKEN.to_string())),
        None => Err(AppError::Unauthorized("Token is not valid".to_string())),
    }
}

/// Check a login attempt against the admin pair without early exit.
pub fn admin_credentials_match(admin: &AdminCredentials, username: &str, password: &str) -> bool {
    let username_ok = constant_time_compare(username, &admin.username);
    let password_ok = constant_time_compare(password, &admin.password);
    username_ok & password_ok
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
