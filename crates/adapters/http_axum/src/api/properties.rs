//! JSON REST handlers for properties and the devices assigned to them.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};
use rentalhub_app::services::property_service::PropertyDevice;
use rentalhub_domain::assignment::{Assignment, OperationalStatus};
use rentalhub_domain::device::Device;
use rentalhub_domain::id::{DeviceId, PropertyId, UserId};
use rentalhub_domain::property::{NewProperty, Property};

use super::{JsonBody, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a property.
#[derive(Deserialize)]
pub struct CreatePropertyRequest {
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub room_number: Option<i32>,
    pub floor_number: Option<i32>,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub occupied: bool,
    pub accessories: Option<serde_json::Value>,
    pub basic_services: Option<serde_json::Value>,
}

impl CreatePropertyRequest {
    fn into_new_property(self) -> NewProperty {
        NewProperty {
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            room_number: self.room_number,
            floor_number: self.floor_number,
            price_cents: self.price_cents,
            occupied: self.occupied,
            accessories: self.accessories,
            basic_services: self.basic_services,
        }
    }
}

/// Request body for assigning a device to a property.
#[derive(Deserialize)]
pub struct AssignDeviceRequest {
    #[serde(alias = "deviceId")]
    pub device_id: String,
    pub role: String,
    /// Initial operational status; the device's resting status when absent.
    pub status: Option<String>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Property>>),
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
    Ok(Json<Property>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Property>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the device listing endpoint.
pub enum ListDevicesResponse {
    Ok(Json<Vec<PropertyDevice>>),
}

impl IntoResponse for ListDevicesResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the assignment endpoint.
pub enum AssignResponse {
    Created(Json<Assignment>),
    Updated(Json<Assignment>),
}

impl IntoResponse for AssignResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
            Self::Updated(json) => json.into_response(),
        }
    }
}

/// `GET /api/properties`
pub async fn list<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
) -> Result<ListResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let properties = state.property_service.list_properties().await?;
    Ok(ListResponse::Ok(Json(properties)))
}

/// `GET /api/properties/{id}`
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
    let property_id: PropertyId = parse_id(&id)?;
    let property = state.property_service.get_property(property_id).await?;
    Ok(GetResponse::Ok(Json(property)))
}

/// `POST /api/properties`
pub async fn create<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
    body: JsonBody<CreatePropertyRequest>,
) -> Result<CreateResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let created = state
        .property_service
        .create_property(req.into_new_property())
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `DELETE /api/properties/{id}`
pub async fn delete<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let property_id: PropertyId = parse_id(&id)?;
    state.property_service.delete_property(property_id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/properties/{id}/devices`
pub async fn list_devices<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
    Path(id): Path<String>,
) -> Result<ListDevicesResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let property_id: PropertyId = parse_id(&id)?;
    let devices = state
        .property_service
        .list_devices_for_property(property_id)
        .await?;
    Ok(ListDevicesResponse::Ok(Json(devices)))
}

/// `POST /api/properties/{id}/devices`
///
/// Upsert on the `(property, device)` pair: `201` when the assignment is
/// new, `200` when an existing one was updated.
pub async fn assign_device<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
    Path(id): Path<String>,
    body: JsonBody<AssignDeviceRequest>,
) -> Result<AssignResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let property_id: PropertyId = parse_id(&id)?;
    let device_id = DeviceId::new(req.device_id)?;
    let role = Device::parse_kind(&req.role)?;
    let status = req
        .status
        .as_deref()
        .map(str::parse::<OperationalStatus>)
        .transpose()?;

    let (assignment, created) = state
        .assignment_service
        .assign_device(property_id, device_id, role, status)
        .await?;

    if created {
        Ok(AssignResponse::Created(Json(assignment)))
    } else {
        Ok(AssignResponse::Updated(Json(assignment)))
    }
}
