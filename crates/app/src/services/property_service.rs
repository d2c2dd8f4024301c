//! Property service: use-cases for the property registry.

use serde::Serialize;

use rentalhub_domain::assignment::{Assignment, OperationalStatus};
use rentalhub_domain::device::{Device, DeviceKind};
use rentalhub_domain::error::{NotFoundError, RentalError};
use rentalhub_domain::id::PropertyId;
use rentalhub_domain::property::{NewProperty, Property};
use rentalhub_domain::time::Timestamp;

use crate::ports::{AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository};

/// A device as seen through one of its properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDevice {
    pub device: Device,
    pub role: DeviceKind,
    pub status: OperationalStatus,
    pub assigned_at: Timestamp,
    pub last_updated: Timestamp,
}

impl PropertyDevice {
    #[must_use]
    pub fn new(device: Device, assignment: Assignment) -> Self {
        Self {
            device,
            role: assignment.role,
            status: assignment.status,
            assigned_at: assignment.assigned_at,
            last_updated: assignment.last_updated,
        }
    }
}

/// Application service for properties and the devices attached to them.
pub struct PropertyService<PR, OR, DR, AR> {
    properties: PR,
    owners: OR,
    devices: DR,
    assignments: AR,
}

impl<PR, OR, DR, AR> PropertyService<PR, OR, DR, AR>
where
    PR: PropertyRepository,
    OR: OwnerRepository,
    DR: DeviceRepository,
    AR: AssignmentRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(properties: PR, owners: OR, devices: DR, assignments: AR) -> Self {
        Self {
            properties,
            owners,
            devices,
            assignments,
        }
    }

    /// Create a property for an existing owner.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] if invariants fail,
    /// [`RentalError::NotFound`] if the owner does not exist, or a storage
    /// error propagated from the repository.
    #[tracing::instrument(skip(self, property), fields(property_name = %property.name))]
    pub async fn create_property(&self, property: NewProperty) -> Result<Property, RentalError> {
        property.validate()?;
        if self.owners.get_by_id(property.owner_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Owner",
                id: property.owner_id.to_string(),
            }
            .into());
        }
        self.properties.create(property).await
    }

    /// Look up a property by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] when no property with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_property(&self, id: PropertyId) -> Result<Property, RentalError> {
        self.properties.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Property",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all properties.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_properties(&self) -> Result<Vec<Property>, RentalError> {
        self.properties.get_all().await
    }

    /// Delete a property. Its assignments are removed, its devices stay registered.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] when no property with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_property(&self, id: PropertyId) -> Result<(), RentalError> {
        if self.properties.delete(id).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "Property",
                id: id.to_string(),
            }
            .into())
        }
    }

    /// The devices assigned to a property, in assignment order.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] when the property does not exist,
    /// or a storage error from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn list_devices_for_property(
        &self,
        id: PropertyId,
    ) -> Result<Vec<PropertyDevice>, RentalError> {
        self.get_property(id).await?;

        let assignments = self.assignments.find_by_property(id).await?;
        let mut devices = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            match self.devices.get_by_id(&assignment.device_id).await? {
                Some(device) => devices.push(PropertyDevice::new(device, assignment)),
                None => {
                    tracing::warn!(device_id = %assignment.device_id, "assignment without device");
                }
            }
        }
        Ok(devices)
    }
}
