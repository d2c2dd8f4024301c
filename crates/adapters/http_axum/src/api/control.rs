//! Synchronous device control.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};
use rentalhub_domain::assignment::OperationalStatus;
use rentalhub_domain::command::ControlCommand;
use rentalhub_domain::device::DeviceStatus;
use rentalhub_domain::id::{DeviceId, PropertyId};

use super::{JsonBody, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for a control command.
#[derive(Deserialize)]
pub struct ControlRequest {
    #[serde(alias = "deviceId")]
    pub device_id: String,
    pub action: String,
}

/// Body returned once the command is applied.
#[derive(Debug, Serialize)]
pub struct ControlBody {
    pub success: bool,
    pub device_id: DeviceId,
    pub status: OperationalStatus,
    pub device_status: DeviceStatus,
}

/// Possible responses from the control endpoint.
pub enum ControlResponse {
    Ok(Json<ControlBody>),
}

impl IntoResponse for ControlResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/properties/{id}/control`
///
/// The response does not wait on subscribers; the new status is broadcast to
/// the property's WebSocket channel independently.
pub async fn execute<DR, OR, PR, AR>(
    State(state): State<AppState<DR, OR, PR, AR>>,
    Path(id): Path<String>,
    body: JsonBody<ControlRequest>,
) -> Result<ControlResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let property_id: PropertyId = parse_id(&id)?;
    let command = ControlCommand::parse(property_id, &req.device_id, &req.action)?;

    let outcome = state.command_gateway.execute(command).await?;

    Ok(ControlResponse::Ok(Json(ControlBody {
        success: true,
        device_id: outcome.device_id,
        status: outcome.status,
        device_status: outcome.device_status,
    })))
}
