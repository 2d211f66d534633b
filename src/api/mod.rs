//! REST API module.
//!
//! One handler family per entity. Reads are public; writes sit behind the
//! access gate, wired up in `create_router`.

mod auth;
mod blog;
mod careers;
mod contact;
mod gallery;
mod services;
mod team;

pub use auth::*;
pub use blog::*;
pub use careers::*;
pub use contact::*;
pub use gallery::*;
pub use services::*;
pub use team::*;

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::AppState;

/// Handler result carrying a JSON body.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Handler result for creates.
pub type Created<T> = Result<(StatusCode, Json<T>), AppError>;

/// JSON body extractor whose rejections use the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Plain `{ message }` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

pub fn created<T>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

/// Recipient for owner notifications.
fn admin_recipient(state: &AppState) -> Result<String, AppError> {
    state
        .config
        .admin_email
        .clone()
        .ok_or_else(|| AppError::Mail("ADMIN_EMAIL is not configured".to_string()))
}
