//! In-memory port implementations shared by the service tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use rentalhub_domain::assignment::Assignment;
use rentalhub_domain::device::Device;
use rentalhub_domain::error::{NotFoundError, RentalError, ValidationError};
use rentalhub_domain::event::PropertyEvent;
use rentalhub_domain::id::{DeviceId, PropertyId, UserId};
use rentalhub_domain::owner::{NewOwner, Owner};
use rentalhub_domain::property::{NewProperty, Property};
use rentalhub_domain::reconciliation::ReconciledWrite;
use rentalhub_domain::time::now;

use crate::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyBroadcaster,
    PropertyRepository,
};

#[derive(Default)]
pub struct Tables {
    pub devices: BTreeMap<DeviceId, Device>,
    pub owners: BTreeMap<UserId, Owner>,
    pub properties: BTreeMap<PropertyId, Property>,
    pub assignments: BTreeMap<(PropertyId, DeviceId), Assignment>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// One shared store, cloned into every service under test.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn device(&self, id: &str) -> Option<Device> {
        let id = DeviceId::new(id).unwrap();
        self.tables.lock().unwrap().devices.get(&id).cloned()
    }

    pub fn assignment_count(&self) -> usize {
        self.tables.lock().unwrap().assignments.len()
    }
}

impl DeviceRepository for InMemoryStore {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, RentalError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        tables.devices.insert(device.id.clone(), device.clone());
        async { Ok(device) }
    }

    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, RentalError>> + Send {
        let result = self.tables.lock().unwrap().devices.get(id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, RentalError>> + Send {
        let result: Vec<Device> = self.tables.lock().unwrap().devices.values().cloned().collect();
        async { Ok(result) }
    }

    fn update_registration(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, RentalError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let conflict = tables
            .assignments
            .values()
            .find(|a| a.device_id == device.id && a.role != device.kind)
            .map(|a| a.role);
        let result: Result<Device, RentalError> = match conflict {
            Some(assigned) => Err(ValidationError::KindConflict {
                assigned,
                requested: device.kind,
            }
            .into()),
            None => Ok(tables
                .devices
                .get_mut(&device.id)
                .map(|existing| {
                    existing.update_registration(device.kind, device.hardware_address.clone());
                    existing.clone()
                })
                .unwrap_or(device)),
        };
        async move { result }
    }
}

impl OwnerRepository for InMemoryStore {
    fn create(&self, owner: NewOwner) -> impl Future<Output = Result<Owner, RentalError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let id = UserId::new(tables.next_id());
        let owner = Owner {
            id,
            name: owner.name,
            email: owner.email,
        };
        tables.owners.insert(id, owner.clone());
        async { Ok(owner) }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<Owner>, RentalError>> + Send {
        let result = self.tables.lock().unwrap().owners.get(&id).cloned();
        async { Ok(result) }
    }

    fn delete(&self, id: UserId) -> impl Future<Output = Result<bool, RentalError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let removed = tables.owners.remove(&id).is_some();
        let owned: Vec<PropertyId> = tables
            .properties
            .values()
            .filter(|p| p.details.owner_id == id)
            .map(|p| p.id)
            .collect();
        for property_id in owned {
            tables.properties.remove(&property_id);
            tables.assignments.retain(|(p, _), _| *p != property_id);
        }
        async move { Ok(removed) }
    }
}

impl PropertyRepository for InMemoryStore {
    fn create(
        &self,
        property: NewProperty,
    ) -> impl Future<Output = Result<Property, RentalError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let ts = now();
        let property = Property {
            id: PropertyId::new(tables.next_id()),
            details: property,
            created_at: ts,
            updated_at: ts,
        };
        tables.properties.insert(property.id, property.clone());
        async { Ok(property) }
    }

    fn get_by_id(
        &self,
        id: PropertyId,
    ) -> impl Future<Output = Result<Option<Property>, RentalError>> + Send {
        let result = self.tables.lock().unwrap().properties.get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Property>, RentalError>> + Send {
        let result: Vec<Property> = self
            .tables
            .lock()
            .unwrap()
            .properties
            .values()
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn delete(&self, id: PropertyId) -> impl Future<Output = Result<bool, RentalError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let removed = tables.properties.remove(&id).is_some();
        tables.assignments.retain(|(p, _), _| *p != id);
        async move { Ok(removed) }
    }
}

impl AssignmentRepository for InMemoryStore {
    fn find(
        &self,
        property_id: PropertyId,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Assignment>, RentalError>> + Send {
        let result = self
            .tables
            .lock()
            .unwrap()
            .assignments
            .get(&(property_id, device_id.clone()))
            .cloned();
        async { Ok(result) }
    }

    fn find_by_property(
        &self,
        property_id: PropertyId,
    ) -> impl Future<Output = Result<Vec<Assignment>, RentalError>> + Send {
        let mut result: Vec<Assignment> = self
            .tables
            .lock()
            .unwrap()
            .assignments
            .values()
            .filter(|a| a.property_id == property_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.assigned_at.cmp(&b.assigned_at));
        async { Ok(result) }
    }

    fn find_by_device(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<Assignment>, RentalError>> + Send {
        let result: Vec<Assignment> = self
            .tables
            .lock()
            .unwrap()
            .assignments
            .values()
            .filter(|a| &a.device_id == device_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn write_reconciled(
        &self,
        write: ReconciledWrite,
    ) -> impl Future<Output = Result<(Assignment, bool), RentalError>> + Send {
        let mut guard = self.tables.lock().unwrap();
        let tables = &mut *guard;
        let role = write.assignment().role;
        let result: Result<(Assignment, bool), RentalError> =
            match tables.devices.get_mut(write.device_id()) {
                None => Err(NotFoundError {
                    entity: "Device",
                    id: write.device_id().to_string(),
                }
                .into()),
                Some(device) if device.kind != role => Err(ValidationError::RoleMismatch {
                    role,
                    kind: device.kind,
                }
                .into()),
                Some(device) => {
                    write.apply_to(device);
                    let mut assignment = write.into_assignment();
                    let stamp = now();
                    let key = (assignment.property_id, assignment.device_id.clone());
                    Ok(match tables.assignments.get_mut(&key) {
                        Some(existing) => {
                            existing.role = assignment.role;
                            existing.status = assignment.status;
                            existing.last_updated = stamp.max(existing.last_updated);
                            (existing.clone(), false)
                        }
                        None => {
                            assignment.assigned_at = stamp;
                            assignment.last_updated = stamp;
                            tables.assignments.insert(key, assignment.clone());
                            (assignment, true)
                        }
                    })
                }
            };
        async { result }
    }
}

/// Broadcaster that remembers everything it was asked to publish.
#[derive(Clone, Default)]
pub struct RecordingBroadcaster {
    pub events: Arc<Mutex<Vec<PropertyEvent>>>,
}

impl RecordingBroadcaster {
    pub fn published(&self) -> Vec<PropertyEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl PropertyBroadcaster for RecordingBroadcaster {
    fn publish(
        &self,
        event: PropertyEvent,
    ) -> impl Future<Output = Result<(), RentalError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
