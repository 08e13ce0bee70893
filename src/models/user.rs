//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    /// `None` until a role is assigned
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Role name as carried in token claims; empty when unassigned
    pub fn role_name(&self) -> &'static str {
        self.role.map(|r| r.as_str()).unwrap_or("")
    }
}

/// Credential record, one per user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Secret {
    pub user_id: Uuid,
    pub password_hash: String,
}

/// Everything written when an account is created
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user: User,
    pub secret: Secret,
    /// License key to mark consumed in the same write
    pub consume_license_key: Option<String>,
}

/// User response (without sensitive data)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(rename = "userid")]
    pub user_id: Uuid,
    pub email: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            role: user.role_name().to_string(),
            user_id: user.user_id,
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}
