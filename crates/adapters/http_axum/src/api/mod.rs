//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod control;
#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod owners;
#[allow(clippy::missing_errors_doc)]
pub mod properties;

use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};

use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};
use rentalhub_domain::error::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON request body whose rejection is answered through [`ApiError`].
pub(crate) type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Parse an id taken from the request path.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ValidationError>,
{
    Ok(raw.parse()?)
}

/// Build the `/api` sub-router.
pub fn routes<DR, OR, PR, AR>() -> Router<AppState<DR, OR, PR, AR>>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    Router::new()
        // Devices
        .route(
            "/devices",
            get(devices::list::<DR, OR, PR, AR>).post(devices::register::<DR, OR, PR, AR>),
        )
        .route("/devices/{id}", get(devices::get::<DR, OR, PR, AR>))
        // Owners
        .route("/owners", post(owners::create::<DR, OR, PR, AR>))
        .route(
            "/owners/{id}",
            get(owners::get::<DR, OR, PR, AR>).delete(owners::delete::<DR, OR, PR, AR>),
        )
        // Properties
        .route(
            "/properties",
            get(properties::list::<DR, OR, PR, AR>).post(properties::create::<DR, OR, PR, AR>),
        )
        .route(
            "/properties/{id}",
            get(properties::get::<DR, OR, PR, AR>).delete(properties::delete::<DR, OR, PR, AR>),
        )
        .route(
            "/properties/{id}/devices",
            get(properties::list_devices::<DR, OR, PR, AR>)
                .post(properties::assign_device::<DR, OR, PR, AR>),
        )
        // Control
        .route(
            "/properties/{id}/control",
            post(control::execute::<DR, OR, PR, AR>),
        )
}
