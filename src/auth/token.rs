//! Bearer credential issuing and verification.
//!
//! Credentials are HS256-signed JWTs carrying the subject id, username and
//! expiry. Verification is a pure computation over the token and the secret.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Decoded identity claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub username: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expires at, seconds since epoch
    pub exp: i64,
}

/// Why a credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    Malformed,
    Expired,
    SignatureInvalid,
}

impl VerifyError {
    /// Client-facing 401 message.
    pub fn message(&self) -> &'static str {
        match self {
            VerifyError::Expired => "Token has expired",
            VerifyError::Malformed | VerifyError::SignatureInvalid => "Token is not valid",
        }
    }
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Malformed => write!(f, "malformed token"),
            VerifyError::Expired => write!(f, "token expired"),
            VerifyError::SignatureInvalid => write!(f, "signature mismatch"),
        }
    }
}

/// Signing material plus credential lifetime.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issue a credential valid for the configured lifetime.
    pub fn issue(&self, subject: &str, username: &str) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        self.issue_with_window(subject, username, now, now.saturating_add(ttl))
    }

    /// Issue a credential with an explicit validity window.
    pub fn issue_with_window(
        &self,
        subject: &str,
        username: &str,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<String, AppError> {
        let claims = Claims {
            sub: subject.to_string(),
            username: username.to_string(),
            iat: issued_at,
            exp: expires_at,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                ErrorKind::InvalidSignature => VerifyError::SignatureInvalid,
                _ => VerifyError::Malformed,
            })
    }
}
