//! Authentication Module
//! Mission: Secure API access with JWT tokens and role-based guards

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, require_role, RoleGuard, ADMIN_ONLY, CUSTOMER_OR_ADMIN};
pub use user_store::UserStore;
