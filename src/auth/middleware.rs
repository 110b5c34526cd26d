//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation and role gates

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, UserRole},
};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Auth middleware that validates JWT tokens
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = verify_request(&jwt_handler, req.headers().get(AUTHORIZATION))?;

    // Add claims to request extensions so guards and handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Check an `Authorization` header and decode the token it carries.
pub fn verify_request(
    jwt_handler: &JwtHandler,
    header: Option<&HeaderValue>,
) -> Result<Claims, AuthError> {
    let token = bearer_token(header)?;

    jwt_handler.validate_token(token).map_err(|e| {
        debug!("Rejected bearer token: {:#}", e);
        AuthError::InvalidOrExpiredToken
    })
}

/// Pull the token out of a `Bearer <token>` header value.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedAuthHeader)?;

    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(char::is_whitespace) => {
            Ok(token)
        }
        _ => Err(AuthError::MalformedAuthHeader),
    }
}

/// A role allow-list evaluated after the token has been verified
#[derive(Debug, Clone, Copy)]
pub struct RoleGuard {
    allowed: &'static [UserRole],
    denial: &'static str,
}

/// Admin-only operations (car mutations)
pub static ADMIN_ONLY: RoleGuard = RoleGuard {
    allowed: &[UserRole::Admin],
    denial: "Access denied. Admin role required.",
};

/// Any signed-in customer or admin
pub static CUSTOMER_OR_ADMIN: RoleGuard = RoleGuard {
    allowed: &[UserRole::Customer, UserRole::Admin],
    denial: "Access denied. Customer or Admin role required.",
};

impl RoleGuard {
    /// Pass the claims through unchanged if their role is allowed
    pub fn check<'a>(&self, claims: &'a Claims) -> Result<&'a Claims, AuthError> {
        if self.allowed.contains(&claims.role) {
            Ok(claims)
        } else {
            Err(AuthError::Forbidden(self.denial))
        }
    }
}

/// Role middleware; must be layered inside `auth_middleware`
pub async fn require_role(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = extract_claims(&req).ok_or(AuthError::MissingAuthHeader)?;
    guard.check(claims)?;

    Ok(next.run(req).await)
}

/// Extract claims from request (use after auth middleware)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

/// Auth error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,
    #[error("Invalid Authorization format")]
    MalformedAuthHeader,
    #[error("Invalid/Expired token")]
    InvalidOrExpiredToken,
    #[error("{0}")]
    Forbidden(&'static str),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
