//! Reconciliation: deriving a device's aggregate status from its assignment.
//!
//! A device is `active` exactly when its assignment says a lock is `open` or
//! a light is `on`. Storage never receives a device status on its own: it
//! receives a [`ReconciledWrite`], which can only be produced here, and
//! persists both halves in one unit of work.

use crate::assignment::{Assignment, OperationalStatus};
use crate::device::{Device, DeviceKind, DeviceStatus};
use crate::error::ValidationError;
use crate::id::DeviceId;

/// Map `(kind, status)` to the device aggregate status.
#[must_use]
pub fn reconcile(kind: DeviceKind, status: OperationalStatus) -> DeviceStatus {
    match (kind, status) {
        (DeviceKind::Lock, OperationalStatus::Open) | (DeviceKind::Light, OperationalStatus::On) => {
            DeviceStatus::Active
        }
        _ => DeviceStatus::Inactive,
    }
}

/// An assignment write together with the device status it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledWrite {
    assignment: Assignment,
    device_status: DeviceStatus,
}

impl ReconciledWrite {
    /// Validate `assignment` against `device` and derive the device status.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the assignment does not belong to
    /// `device` or violates its role/vocabulary invariants.
    pub fn derive(device: &Device, assignment: Assignment) -> Result<Self, ValidationError> {
        if assignment.device_id != device.id {
            return Err(ValidationError::InvalidId(assignment.device_id.to_string()));
        }
        assignment.validate_for(device.kind)?;
        let device_status = reconcile(device.kind, assignment.status);
        Ok(Self {
            assignment,
            device_status,
        })
    }

    #[must_use]
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.assignment.device_id
    }

    #[must_use]
    pub fn device_status(&self) -> DeviceStatus {
        self.device_status
    }

    /// Write the derived status onto an in-memory device.
    pub fn apply_to(&self, device: &mut Device) {
        if device.id == self.assignment.device_id {
            device.set_status(self.device_status);
        }
    }

    #[must_use]
    pub fn into_assignment(self) -> Assignment {
        self.assignment
    }
}
