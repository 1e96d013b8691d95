//! Custom Axum extractors
//!
//! `DbConn` is the per-request connection scope: extracting it checks out a
//! pooled connection and applies the session settings; dropping it at the end
//! of the handler returns the connection, whatever the handler's outcome.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;

use super::error::ApiError;
use super::server::AppState;
use crate::db::ScopedConnection;
use crate::models::{CarId, ValidationError};

/// Request-scoped database connection
pub struct DbConn(pub ScopedConnection);

impl FromRequestParts<Arc<AppState>> for DbConn {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let conn = state.checkout().await?;
        Ok(Self(conn))
    }
}

/// Extract and validate a car id from path
pub struct ValidCarId(pub CarId);

impl<S> FromRequestParts<S> for ValidCarId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Missing { field: "id" }))?;

        let id = CarId::parse(&id)?;
        Ok(Self(id))
    }
}

/// JSON body whose decode failures become `validation_error` responses
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::Validation(ValidationError::Body {
                reason: rejection.body_text(),
            })
        })?;

        Ok(Self(value))
    }
}
