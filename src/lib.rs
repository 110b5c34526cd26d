//! Car Listing API Library
//!
//! Exposes the service modules for the binary and the integration tests.

pub mod app;
pub mod auth;
pub mod cars;
pub mod config;
pub mod db;
pub mod middleware;

pub use app::{build_router, AppServices};
