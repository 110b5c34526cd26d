//! Car API Endpoints
//! Mission: Translate HTTP requests into catalog operations

use crate::cars::{
    models::{Car, CarPatch, CreateCarRequest},
    store::CarStore,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Unwrap a JSON body. A request without a JSON body is treated as an empty
/// one; a JSON body that does not fit `T` is rejected with the decoder's reason.
fn json_body<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, CarApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            let reason = rejection.body_text();
            debug!("Rejected car request body: {}", reason);
            Err(CarApiError::InvalidBody(reason))
        }
    }
}

/// List all cars - GET /allcars
pub async fn list_cars(State(store): State<Arc<CarStore>>) -> Result<Json<Vec<Car>>, CarApiError> {
    let cars = store.list_cars().await.map_err(|e| {
        error!("Failed to list cars: {:#}", e);
        CarApiError::ServerError("Server error for allcars".to_string())
    })?;

    Ok(Json(cars))
}

/// Create car - POST /addcar (Admin only)
pub async fn create_car(
    State(store): State<Arc<CarStore>>,
    payload: Result<Json<CreateCarRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), CarApiError> {
    let payload = json_body(payload)?;
    let name = payload.display_name().to_string();

    let car = payload
        .into_new_car()
        .map_err(CarApiError::MissingInput)?;

    let id = store.insert_car(car).await.map_err(|e| {
        error!("Failed to add car {}: {:#}", name, e);
        CarApiError::ServerError(format!("Server error - could not add car {}", name))
    })?;

    info!("✅ Car added: {} (id {})", name, id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Car {} added successfully", name),
            "id": id,
        })),
    ))
}

/// Partially update car - PUT /editcar/:id (Admin only)
pub async fn update_car(
    State(store): State<Arc<CarStore>>,
    Path(id): Path<i64>,
    payload: Result<Json<CarPatch>, JsonRejection>,
) -> Result<Json<Value>, CarApiError> {
    let patch = json_body(payload)?;

    if patch.is_empty() {
        return Err(CarApiError::NoFieldsToUpdate);
    }

    let rows = store.update_car(id, patch).await.map_err(|e| {
        error!("Failed to update car id {}: {:#}", id, e);
        CarApiError::ServerError(format!("Server error - could not update car id {}", id))
    })?;

    if rows == 0 {
        return Err(CarApiError::NotFound);
    }

    info!("✏️  Car id {} updated", id);

    Ok(Json(json!({
        "message": format!("Car id {} updated successfully", id)
    })))
}

/// Delete car - DELETE /deletecar/:id (Admin only)
pub async fn delete_car(
    State(store): State<Arc<CarStore>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, CarApiError> {
    let rows = store.delete_car(id).await.map_err(|e| {
        error!("Failed to delete car id {}: {:#}", id, e);
        CarApiError::ServerError("Server error for deletecar".to_string())
    })?;

    if rows == 0 {
        return Err(CarApiError::NotFound);
    }

    info!("🗑️  Car id {} deleted", id);

    Ok(Json(json!({
        "message": format!("Car id {} deleted successfully", id),
        "affectedRows": rows,
    })))
}

/// Car API errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarApiError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingInput(Vec<&'static str>),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Nothing to update")]
    NoFieldsToUpdate,
    #[error("Car not found")]
    NotFound,
    /// Data-access fault; carries the generic message shown to the caller
    #[error("{0}")]
    ServerError(String),
}

impl IntoResponse for CarApiError {
    fn into_response(self) -> Response {
        let status = match self {
            CarApiError::MissingInput(_)
            | CarApiError::InvalidBody(_)
            | CarApiError::NoFieldsToUpdate => {
                StatusCode::BAD_REQUEST
            }
            CarApiError::NotFound => StatusCode::NOT_FOUND,
            CarApiError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
