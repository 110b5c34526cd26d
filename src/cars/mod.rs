//! Car Catalog Module
//! Mission: List, create, patch and delete cars

pub mod api;
pub mod models;
pub mod store;

pub use store::CarStore;
