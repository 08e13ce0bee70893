//! Authentication-related models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::Role;

/// Member sign-up request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignUpRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "role_code is required"))]
    pub role_code: String,
}

/// Administrator sign-up request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AdminSignUpRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "license_key is required"))]
    pub license_key: String,
}

/// Sign-in request. When `name` is present it must match as well as the email.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Sign-in response
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub refresh_token: String,
    pub token_type: String,
    /// seconds
    pub lifetime: u64,
}

/// Member role code reference entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoleCode {
    pub code: String,
    pub role: Role,
}

/// Administrator license reference entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LicenseKey {
    pub license_key: String,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl LicenseKey {
    pub fn is_outstanding(&self) -> bool {
        self.consumed_at.is_none()
    }
}
