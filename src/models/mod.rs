//! Data models for the site backend.
//!
//! Each entity is a flat document with a generated id and server-assigned
//! timestamps. Request payloads use optional fields so that missing required
//! fields surface as validation errors rather than decode failures.

mod blog;
mod career;
mod gallery;
mod service;
mod submission;
mod team;
mod user;

pub use blog::*;
pub use career::*;
pub use gallery::*;
pub use service::*;
pub use submission::*;
pub use team::*;
pub use user::*;

use crate::errors::AppError;

/// Take a required string field, trimmed and non-empty.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Trim an optional string field, dropping it when blank.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
