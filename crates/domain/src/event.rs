//! Property events: state changes fanned out to a property's subscribers.

use serde::{Deserialize, Serialize};

use crate::assignment::OperationalStatus;
use crate::device::DeviceKind;
use crate::id::{DeviceId, PropertyId};

/// Something that happened to a device within one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyEvent {
    /// A control command changed a device's operational status.
    DeviceStatus {
        property_id: PropertyId,
        device_id: DeviceId,
        status: OperationalStatus,
    },
    /// A device was assigned (or re-assigned) to the property.
    DeviceAssigned {
        property_id: PropertyId,
        device_id: DeviceId,
        role: DeviceKind,
        status: OperationalStatus,
    },
}

impl PropertyEvent {
    /// The channel this event is scoped to.
    #[must_use]
    pub fn property_id(&self) -> PropertyId {
        match self {
            Self::DeviceStatus { property_id, .. } | Self::DeviceAssigned { property_id, .. } => {
                *property_id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_with_type_tag() {
        let event = PropertyEvent::DeviceStatus {
            property_id: PropertyId::new(1),
            device_id: DeviceId::new("D1").unwrap(),
            status: OperationalStatus::Open,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "device_status",
                "property_id": 1,
                "device_id": "D1",
                "status": "open",
            })
        );
    }

    #[test]
    fn should_expose_property_id() {
        let event = PropertyEvent::DeviceAssigned {
            property_id: PropertyId::new(9),
            device_id: DeviceId::new("L1").unwrap(),
            role: DeviceKind::Light,
            status: OperationalStatus::Off,
        };
        assert_eq!(event.property_id(), PropertyId::new(9));
    }
}
