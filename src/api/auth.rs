//! Authentication endpoints.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use super::{created, message, ApiJson, ApiResult, Created, MessageResponse};
use crate::auth::{admin_credentials_match, Claims, ADMIN_SUBJECT};
use crate::db::{new_id, now_timestamp, Filter};
use crate::errors::AppError;
use crate::models::{optional, CredentialsRequest, LoginResponse, User, UserProfile};
use crate::AppState;

/// bcrypt work factor for registered passwords.
const BCRYPT_COST: u32 = 10;

/// POST /api/auth/login - Exchange the admin pair for a bearer credential.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> ApiResult<LoginResponse> {
    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let Some(admin) = state.config.admin.as_ref() else {
        tracing::warn!("Login attempted but admin credentials are not configured");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    if !admin_credentials_match(admin, &username, &password) {
        tracing::info!("Rejected login attempt");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.tokens.issue(ADMIN_SUBJECT, &admin.username)?;
    tracing::info!(username = %admin.username, "Admin logged in");

    Ok(Json(LoginResponse {
        token,
        message: "Login successful".to_string(),
    }))
}

/// POST /api/auth/register - Create a stored user account.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> Created<MessageResponse> {
    let (Some(username), Some(password)) = (optional(request.username), request.password) else {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    };
    if password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let reserved = state
        .config
        .admin
        .as_ref()
        .is_some_and(|admin| admin.username == username);
    let existing: Option<User> = state
        .store
        .find_one(&Filter::eq("username", username.clone()))
        .await?;
    if reserved || existing.is_some() {
        return Err(AppError::Validation("Username already exists".to_string()));
    }

    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let user = User {
        id: new_id(),
        username,
        password_hash,
        is_admin: false,
        created_at: now_timestamp(),
    };
    // A concurrent registration of the same name loses at the unique index
    state.store.insert(&user).await.map_err(|e| match e {
        AppError::Conflict(_) => AppError::Validation("Username already exists".to_string()),
        other => other,
    })?;
    tracing::info!(id = %user.id, username = %user.username, "User registered");

    Ok(created(MessageResponse {
        message: "User created successfully".to_string(),
    }))
}

/// GET /api/auth/user - Profile of the authenticated identity.
pub async fn current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<UserProfile> {
    if claims.sub == ADMIN_SUBJECT {
        return Ok(Json(UserProfile {
            id: ADMIN_SUBJECT.to_string(),
            username: claims.username,
            is_admin: true,
            created_at: None,
        }));
    }

    let user: User = state.store.get(&claims.sub).await.map_err(|e| match e {
        AppError::NotFound(_) | AppError::InvalidId(_) => {
            AppError::NotFound("User not found".to_string())
        }
        other => other,
    })?;
    Ok(Json(user.into()))
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: Claims,
}

/// GET /api/auth/verify
pub async fn verify_token(Extension(claims): Extension<Claims>) -> ApiResult<VerifyResponse> {
    Ok(Json(VerifyResponse {
        valid: true,
        user: claims,
    }))
}

/// POST /api/auth/logout - Stateless; the client discards its credential.
pub async fn logout() -> ApiResult<MessageResponse> {
    Ok(message("Logged out successfully"))
}
