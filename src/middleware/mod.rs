//! Middleware shared by every route.
//!
//! This module provides:
//! - Request logging with latency tracking
//! - The CORS allow-list layer

pub mod cors;
pub mod logging;

pub use cors::cors_layer;
pub use logging::request_logging;
