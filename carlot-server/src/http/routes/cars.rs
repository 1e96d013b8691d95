//! Car endpoints
//!
//! - GET    /car       list records that are not soft-deleted
//! - POST   /car       create a record
//! - PUT    /car       change a record's year
//! - DELETE /car/{id}  toggle a record's deleted_flag

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Car, CarRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{DbConn, JsonBody, ValidCarId};
use crate::http::server::AppState;
use crate::models::{
    require, CarId, CarText, CarYear, DeletedFlag, NewCar, ValidationError, YearUpdate,
};

/// Create car request
///
/// Fields are optional at the serde level so that a missing field is
/// reported by name instead of as a generic decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCarRequest {
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub deleted_flag: Option<i64>,
}

impl CreateCarRequest {
    pub fn validate(self) -> Result<NewCar, ValidationError> {
        let year = CarYear::new(require(self.year, "year")?)?;
        let make = CarText::new("make", &require(self.make, "make")?)?;
        let model = CarText::new("model", &require(self.model, "model")?)?;
        let deleted_flag = DeletedFlag::try_from(require(self.deleted_flag, "deleted_flag")?)?;

        Ok(NewCar {
            year,
            make,
            model,
            deleted_flag,
        })
    }
}

/// Update year request
#[derive(Debug, Default, Deserialize)]
pub struct UpdateYearRequest {
    pub id: Option<i64>,
    pub year: Option<i64>,
}

impl UpdateYearRequest {
    pub fn validate(self) -> Result<YearUpdate, ValidationError> {
        let id = CarId::new(require(self.id, "id")?)?;
        let year = CarYear::new(require(self.year, "year")?)?;
        Ok(YearUpdate { id, year })
    }
}

/// List response
#[derive(Debug, Serialize)]
pub struct CarListResponse {
    pub cars: Vec<Car>,
}

/// Toggle acknowledgement
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
}

/// GET /car - list records with deleted_flag = 0
async fn list_cars(DbConn(mut conn): DbConn) -> Result<Json<CarListResponse>, ApiError> {
    let cars = CarRepo::new(&mut conn).list_active().await?;
    tracing::debug!(count = cars.len(), "listed active cars");

    Ok(Json(CarListResponse { cars }))
}

/// POST /car - create a record
///
/// The body is validated before a connection is checked out.
async fn create_car(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateCarRequest>,
) -> Result<Json<Car>, ApiError> {
    let new_car = req.validate()?;
    let mut conn = state.checkout().await?;
    let car = CarRepo::new(&mut conn).create(new_car).await?;
    tracing::info!(id = car.id, make = %car.make, model = %car.model, "car created");

    Ok(Json(car))
}

/// PUT /car - change the year of an existing record
async fn update_year(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UpdateYearRequest>,
) -> Result<Json<Car>, ApiError> {
    let update = req.validate()?;
    let mut conn = state.checkout().await?;
    let car = CarRepo::new(&mut conn).update_year(update).await?;
    tracing::info!(id = car.id, year = car.year, "car year updated");

    Ok(Json(car))
}

/// DELETE /car/{id} - flip deleted_flag
async fn toggle_deleted(
    ValidCarId(id): ValidCarId,
    DbConn(mut conn): DbConn,
) -> Result<Json<ToggleResponse>, ApiError> {
    let affected = CarRepo::new(&mut conn).toggle_deleted(id).await?;
    if affected == 0 {
        tracing::debug!(id = id.get(), "toggle matched no record");
    } else {
        tracing::info!(id = id.get(), "car deleted_flag toggled");
    }

    Ok(Json(ToggleResponse { success: true }))
}

/// Car routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/car", get(list_cars).post(create_car).put(update_year))
        .route("/car/{id}", delete(toggle_deleted))
}
