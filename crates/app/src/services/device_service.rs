//! Device service: use-cases for the device registry.

use rentalhub_domain::device::{Device, DeviceKind};
use rentalhub_domain::error::{NotFoundError, RentalError};
use rentalhub_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Application service for device registration and lookup.
///
/// The aggregate status is never written here; only the assignment ledger
/// writes it.
pub struct DeviceService<DR> {
    devices: DR,
}

impl<DR> DeviceService<DR>
where
    DR: DeviceRepository,
{
    /// Create a new service backed by the given repository.
    pub fn new(devices: DR) -> Self {
        Self { devices }
    }

    /// Register a device, or update its metadata if `id` is already known.
    ///
    /// New devices start `inactive`. Returns the stored device and whether
    /// it was newly created.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] when the kind would change while
    /// the device still holds assignments under its old role. The repository
    /// checks this atomically with the write. Storage errors propagate.
    #[tracing::instrument(skip(self, hardware_address))]
    pub async fn register_device(
        &self,
        id: DeviceId,
        kind: DeviceKind,
        hardware_address: Option<String>,
    ) -> Result<(Device, bool), RentalError> {
        let Some(mut existing) = self.devices.get_by_id(&id).await? else {
            let device = Device::register(id, kind, hardware_address);
            let created = self.devices.create(device).await?;
            tracing::info!(device_id = %created.id, kind = %created.kind, "device registered");
            return Ok((created, true));
        };

        existing.update_registration(kind, hardware_address);
        let updated = self.devices.update_registration(existing).await?;
        tracing::debug!(device_id = %updated.id, "device registration refreshed");
        Ok((updated, false))
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: &DeviceId) -> Result<Device, RentalError> {
        self.devices.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, RentalError> {
        self.devices.get_all().await
    }
}
