//! Command gateway: the single control path for devices.
//!
//! Both the request/response API and the persistent WebSocket channel hand
//! their commands to [`CommandGateway::execute`]; they only differ in how the
//! outcome (or error) is reported back to the caller.

use serde::Serialize;

use rentalhub_domain::assignment::OperationalStatus;
use rentalhub_domain::command::{Action, ControlCommand};
use rentalhub_domain::device::DeviceStatus;
use rentalhub_domain::error::{ForbiddenError, NotFoundError, RentalError};
use rentalhub_domain::event::PropertyEvent;
use rentalhub_domain::id::{DeviceId, PropertyId};
use rentalhub_domain::reconciliation::ReconciledWrite;

use crate::ports::{AssignmentRepository, DeviceRepository, PropertyBroadcaster};

/// Result of a successfully applied command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub property_id: PropertyId,
    pub device_id: DeviceId,
    pub action: Action,
    pub status: OperationalStatus,
    pub device_status: DeviceStatus,
}

/// Authorizes, applies and broadcasts control commands.
pub struct CommandGateway<DR, AR, B> {
    devices: DR,
    assignments: AR,
    broadcaster: B,
}

impl<DR, AR, B> CommandGateway<DR, AR, B>
where
    DR: DeviceRepository,
    AR: AssignmentRepository,
    B: PropertyBroadcaster,
{
    /// Create a new gateway backed by the given repositories and broadcaster.
    pub fn new(devices: DR, assignments: AR, broadcaster: B) -> Self {
        Self {
            devices,
            assignments,
            broadcaster,
        }
    }

    /// Run a control command end to end.
    ///
    /// 1. the device must be assigned to the property
    /// 2. the device type decides the target operational status
    /// 3. assignment status and device aggregate status are written together
    /// 4. the new status is broadcast to the property's subscribers
    ///
    /// A failed broadcast is logged and does not fail the command.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Forbidden`] when the device is not assigned to
    /// the property, [`RentalError::NotFound`] when the device is gone,
    /// [`RentalError::Validation`] when the resulting status is illegal, or a
    /// storage error.
    #[tracing::instrument(
        skip(self, command),
        fields(
            property_id = %command.property_id,
            device_id = %command.device_id,
            action = %command.action,
        )
    )]
    pub async fn execute(&self, command: ControlCommand) -> Result<CommandOutcome, RentalError> {
        let ControlCommand {
            property_id,
            device_id,
            action,
        } = command;

        let Some(mut assignment) = self.assignments.find(property_id, &device_id).await? else {
            tracing::warn!("rejected command for unassigned device");
            return Err(ForbiddenError::NotAssigned {
                property_id: property_id.to_string(),
                device_id: device_id.to_string(),
            }
            .into());
        };

        let device = self.devices.get_by_id(&device_id).await?.ok_or_else(|| {
            RentalError::from(NotFoundError {
                entity: "Device",
                id: device_id.to_string(),
            })
        })?;

        let status = action.target_status(device.kind);
        assignment.transition(device.kind, status)?;

        let write = ReconciledWrite::derive(&device, assignment)?;
        let device_status = write.device_status();
        let (stored, _) = self.assignments.write_reconciled(write).await?;
        tracing::info!(status = %stored.status, %device_status, "command applied");

        let event = PropertyEvent::DeviceStatus {
            property_id,
            device_id: device_id.clone(),
            status: stored.status,
        };
        if let Err(err) = self.broadcaster.publish(event).await {
            tracing::warn!(%err, "failed to broadcast device status");
        }

        Ok(CommandOutcome {
            property_id,
            device_id,
            action,
            status: stored.status,
            device_status,
        })
    }
}
