//! Application wiring
//! Mission: Assemble stores, token handler and routes into one router

use crate::{
    auth::{
        api as auth_api, auth_middleware, require_role, AuthState, JwtHandler, UserStore,
        ADMIN_ONLY, CUSTOMER_OR_ADMIN,
    },
    cars::{api as cars_api, CarStore},
    config::Config,
    db::Database,
    middleware::{cors_layer, request_logging},
};
use anyhow::Result;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

/// Everything the routes need, built once at startup
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthState,
    pub cars: Arc<CarStore>,
}

impl AppServices {
    pub fn new(db: Database, jwt_secret: &str, bcrypt_cost: u32) -> Result<Self> {
        let user_store = Arc::new(UserStore::new(db.clone(), bcrypt_cost)?);
        let jwt_handler = Arc::new(JwtHandler::new(jwt_secret));

        Ok(Self {
            auth: AuthState::new(user_store, jwt_handler),
            cars: Arc::new(CarStore::new(db)),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let db = Database::open(&config.database_path, config.db_pool_size)?;
        Self::new(db, &config.jwt_secret, config.bcrypt_cost)
    }
}

/// Build the full route table
pub fn build_router(services: &AppServices, cors_origins: &[String]) -> Router {
    let jwt_handler = services.auth.jwt_handler.clone();

    let auth_router = Router::new()
        .route("/login", post(auth_api::login))
        .with_state(services.auth.clone());

    let public_car_routes = Router::new()
        .route("/allcars", get(cars_api::list_cars))
        .with_state(services.cars.clone());

    // Layers run bottom-up: token check first, then the role gate.
    let admin_car_routes = Router::new()
        .route("/addcar", post(cars_api::create_car))
        .route("/editcar/:id", put(cars_api::update_car))
        .route("/deletecar/:id", delete(cars_api::delete_car))
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, require_role))
        .route_layer(middleware::from_fn_with_state(
            jwt_handler.clone(),
            auth_middleware,
        ))
        .with_state(services.cars.clone());

    let account_routes = Router::new()
        .route("/me", get(auth_api::get_current_user))
        .route_layer(middleware::from_fn_with_state(
            CUSTOMER_OR_ADMIN,
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_router)
        .merge(public_car_routes)
        .merge(admin_car_routes)
        .merge(account_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(cors_origins))
}

async fn health_check() -> &'static str {
    "🚗 Car listing API operational"
}
