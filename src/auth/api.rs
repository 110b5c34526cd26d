//! Authentication API Endpoints
//! Mission: Exchange credentials for bearer tokens

use crate::auth::{
    jwt::JwtHandler,
    middleware::extract_claims,
    models::{CurrentUserResponse, LoginRequest, LoginResponse, UserResponse},
    user_store::UserStore,
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }

    /// Check a username/password pair and issue a token for it.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<LoginResponse, AuthApiError> {
        let (username, password) = match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => return Err(AuthApiError::MissingInput),
        };

        info!("🔐 Login attempt: {}", username);

        let user = self
            .user_store
            .verify_credentials(username, password)
            .await
            .map_err(|e| {
                error!("Credential lookup failed for {}: {:#}", username, e);
                AuthApiError::ServerError
            })?
            .ok_or_else(|| {
                warn!("❌ Failed login attempt: {}", username);
                AuthApiError::InvalidCredentials
            })?;

        let token = self.jwt_handler.generate_token(&user).map_err(|e| {
            error!("Token issue failed for {}: {:#}", username, e);
            AuthApiError::ServerError
        })?;

        info!("✅ Login successful: {} ({})", user.username, user.role);

        Ok(LoginResponse {
            token,
            user: UserResponse::from_user(&user),
        })
    }
}

/// Login endpoint - POST /login
pub async fn login(
    State(state): State<AuthState>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    state
        .authenticate(payload.username.as_deref(), payload.password.as_deref())
        .await
        .map(Json)
}

/// Get current user info - GET /me
/// Built from the verified token claims, no database lookup
pub async fn get_current_user(req: Request) -> Result<Json<CurrentUserResponse>, AuthApiError> {
    let claims = extract_claims(&req).ok_or(AuthApiError::InvalidCredentials)?;
    Ok(Json(CurrentUserResponse::from(claims)))
}

/// Auth API errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthApiError {
    #[error("Username and password required")]
    MissingInput,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Server error during login")]
    ServerError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthApiError::MissingInput => StatusCode::BAD_REQUEST,
            AuthApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthApiError::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
