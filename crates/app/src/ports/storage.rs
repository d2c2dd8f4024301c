//! Storage port: repository traits for persistence.

use std::future::Future;

use rentalhub_domain::assignment::Assignment;
use rentalhub_domain::device::Device;
use rentalhub_domain::error::RentalError;
use rentalhub_domain::id::{DeviceId, PropertyId, UserId};
use rentalhub_domain::owner::{NewOwner, Owner};
use rentalhub_domain::property::{NewProperty, Property};
use rentalhub_domain::reconciliation::ReconciledWrite;

/// Repository for the device registry.
pub trait DeviceRepository {
    /// Insert a newly registered device.
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, RentalError>> + Send;

    /// Get a device by its identifier.
    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, RentalError>> + Send;

    /// Get all devices, ordered by id.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, RentalError>> + Send;

    /// Persist registration metadata (kind, hardware address).
    ///
    /// Must not touch the aggregate status column. Fails with
    /// `ValidationError::KindConflict` when the device holds an assignment
    /// under another role; the check and the write are one atomic step.
    fn update_registration(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, RentalError>> + Send;
}

/// Repository for property owners.
pub trait OwnerRepository {
    fn create(&self, owner: NewOwner) -> impl Future<Output = Result<Owner, RentalError>> + Send;

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<Owner>, RentalError>> + Send;

    /// Delete an owner together with its properties and their assignments.
    ///
    /// Returns `false` when nothing was deleted.
    fn delete(&self, id: UserId) -> impl Future<Output = Result<bool, RentalError>> + Send;
}

/// Repository for properties.
pub trait PropertyRepository {
    fn create(
        &self,
        property: NewProperty,
    ) -> impl Future<Output = Result<Property, RentalError>> + Send;

    fn get_by_id(
        &self,
        id: PropertyId,
    ) -> impl Future<Output = Result<Option<Property>, RentalError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Property>, RentalError>> + Send;

    /// Delete a property together with its assignments. Devices stay.
    ///
    /// Returns `false` when nothing was deleted.
    fn delete(&self, id: PropertyId) -> impl Future<Output = Result<bool, RentalError>> + Send;
}

/// The assignment ledger.
pub trait AssignmentRepository {
    /// Look up the assignment for a `(property, device)` pair.
    fn find(
        &self,
        property_id: PropertyId,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Assignment>, RentalError>> + Send;

    /// All assignments of a property, oldest first.
    fn find_by_property(
        &self,
        property_id: PropertyId,
    ) -> impl Future<Output = Result<Vec<Assignment>, RentalError>> + Send;

    /// All assignments of a device.
    fn find_by_device(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<Assignment>, RentalError>> + Send;

    /// Upsert the assignment and store the derived device status in a
    /// single unit of work.
    ///
    /// `last_updated` is stamped by the store once the write is serialized,
    /// so the latest commit carries the latest timestamp. Fails with
    /// `ValidationError::RoleMismatch` when the stored device kind no longer
    /// matches the role the write was derived from, and with `NotFound`
    /// when the device is gone. Nothing is written on failure.
    ///
    /// Returns the stored assignment and whether the row was created.
    fn write_reconciled(
        &self,
        write: ReconciledWrite,
    ) -> impl Future<Output = Result<(Assignment, bool), RentalError>> + Send;
}
