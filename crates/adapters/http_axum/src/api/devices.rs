//! JSON REST handlers for the device registry.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};
use rentalhub_domain::device::Device;
use rentalhub_domain::id::DeviceId;

use super::{JsonBody, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body sent by a device (or an operator) to register itself.
#[derive(Deserialize)]
pub struct RegisterDeviceRequest {
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(default, alias = "macAddress", alias = "hardwareAddress")]
    pub hardware_address: Option<String>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Device>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the register endpoint.
pub enum RegisterResponse {
    Created(Json<Device>),
    Updated(Json<Device>),
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
            Self::Updated(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
) -> Result<ListResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let devices = state.device_service.list_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/{id}`
pub async fn get<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let device_id: DeviceId = parse_id(&id)?;
    let device = state.device_service.get_device(&device_id).await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `POST /api/devices`
///
/// Idempotent on `id`: `201` when the device is new, `200` when its
/// registration was refreshed.
pub async fn register<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
    body: JsonBody<RegisterDeviceRequest>,
) -> Result<RegisterResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let device_id = DeviceId::new(req.id)?;
    let kind = Device::parse_kind(&req.kind)?;

    let (device, created) = state
        .device_service
        .register_device(device_id, kind, req.hardware_address)
        .await?;

    if created {
        Ok(RegisterResponse::Created(Json(device)))
    } else {
        Ok(RegisterResponse::Updated(Json(device)))
    }
}
