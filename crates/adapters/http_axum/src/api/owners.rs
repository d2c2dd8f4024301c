//! JSON REST handlers for property owners.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};
use rentalhub_domain::id::UserId;
use rentalhub_domain::owner::{NewOwner, Owner};

use super::{JsonBody, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an owner.
#[derive(Deserialize)]
pub struct CreateOwnerRequest {
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Owner>),
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
    Created(Json<Owner>),
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

/// `POST /api/owners`
pub async fn create<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
    body: JsonBody<CreateOwnerRequest>,
) -> Result<CreateResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let owner = NewOwner::new(req.name, req.email)?;
    let created = state.owner_service.create_owner(owner).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/owners/{id}`
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
    let owner_id: UserId = parse_id(&id)?;
    let owner = state.owner_service.get_owner(owner_id).await?;
    Ok(GetResponse::Ok(Json(owner)))
}

/// `DELETE /api/owners/{id}`
///
/// Removes the owner's properties and their assignments as well.
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
    let owner_id: UserId = parse_id(&id)?;
    state.owner_service.delete_owner(owner_id).await?;
    Ok(DeleteResponse::NoContent)
}
