//! Assignment service: attaching devices to properties.

use rentalhub_domain::assignment::{Assignment, OperationalStatus};
use rentalhub_domain::device::DeviceKind;
use rentalhub_domain::error::{NotFoundError, RentalError};
use rentalhub_domain::event::PropertyEvent;
use rentalhub_domain::id::{DeviceId, PropertyId};
use rentalhub_domain::reconciliation::ReconciledWrite;

use crate::ports::{AssignmentRepository, DeviceRepository, PropertyBroadcaster, PropertyRepository};

/// Application service owning the assignment ledger's write path for
/// direct assignments.
pub struct AssignmentService<PR, DR, AR, B> {
    properties: PR,
    devices: DR,
    assignments: AR,
    broadcaster: B,
}

impl<PR, DR, AR, B> AssignmentService<PR, DR, AR, B>
where
    PR: PropertyRepository,
    DR: DeviceRepository,
    AR: AssignmentRepository,
    B: PropertyBroadcaster,
{
    /// Create a new service backed by the given repositories and broadcaster.
    pub fn new(properties: PR, devices: DR, assignments: AR, broadcaster: B) -> Self {
        Self {
            properties,
            devices,
            assignments,
            broadcaster,
        }
    }

    /// Assign a device to a property, or update the existing assignment.
    ///
    /// The device's aggregate status is reconciled in the same write. When
    /// `status` is `None` the device's resting status is used. Returns the
    /// stored assignment and whether it was created.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] when the property or device is
    /// missing, [`RentalError::Validation`] when `role` does not match the
    /// device type or `status` is outside its vocabulary, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn assign_device(
        &self,
        property_id: PropertyId,
        device_id: DeviceId,
        role: DeviceKind,
        status: Option<OperationalStatus>,
    ) -> Result<(Assignment, bool), RentalError> {
        if self.properties.get_by_id(property_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Property",
                id: property_id.to_string(),
            }
            .into());
        }
        let device = self.devices.get_by_id(&device_id).await?.ok_or_else(|| {
            RentalError::from(NotFoundError {
                entity: "Device",
                id: device_id.to_string(),
            })
        })?;

        let assignment = match self.assignments.find(property_id, &device_id).await? {
            Some(mut existing) => {
                existing.reassign(&device, role, status)?;
                existing
            }
            None => Assignment::new(property_id, &device, role, status)?,
        };

        let write = ReconciledWrite::derive(&device, assignment)?;
        let (stored, created) = self.assignments.write_reconciled(write).await?;
        tracing::info!(
            %property_id,
            %device_id,
            status = %stored.status,
            created,
            "device assigned"
        );

        let event = PropertyEvent::DeviceAssigned {
            property_id,
            device_id,
            role: stored.role,
            status: stored.status,
        };
        if let Err(err) = self.broadcaster.publish(event).await {
            tracing::warn!(%err, "failed to broadcast assignment");
        }

        Ok((stored, created))
    }

    /// Look up the assignment linking `device_id` to `property_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] when the pair is not assigned, or a
    /// storage error from the repository.
    pub async fn find_assignment(
        &self,
        property_id: PropertyId,
        device_id: &DeviceId,
    ) -> Result<Assignment, RentalError> {
        self.assignments
            .find(property_id, device_id)
            .await?
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Assignment",
                    id: format!("{property_id}/{device_id}"),
                }
                .into()
            })
    }
}
