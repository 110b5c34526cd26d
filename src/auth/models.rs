//! Authentication Models
//! Mission: Define user, role and token data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// User account as stored in the credential table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub email: Option<String>,
    pub role: UserRole,
}

/// User roles for RBAC.
///
/// Unknown role strings from the credential table are kept verbatim in
/// `Other` so they round-trip through tokens; no guard ever admits them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    Admin,
    Customer,
    Other(String),
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Customer => "customer",
            UserRole::Other(role) => role,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            "admin" => UserRole::Admin,
            "customer" => UserRole::Customer,
            other => UserRole::Other(other.to_string()),
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        UserRole::from(s.as_str())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    pub iat: i64, // issued-at timestamp
    pub exp: i64, // expiration timestamp
}

/// Login request body. Fields are optional so a missing one maps to a 400
/// instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// User response (sanitized)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: UserRole,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

/// Identity echoed back by `GET /me`, taken from the token alone
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: TokenIdentity,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenIdentity {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl From<&Claims> for CurrentUserResponse {
    fn from(claims: &Claims) -> Self {
        Self {
            user: TokenIdentity {
                user_id: claims.user_id,
                username: claims.username.clone(),
                role: claims.role.clone(),
            },
            exp: claims.exp,
        }
    }
}
