//! Control commands sent to a device through one of its properties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assignment::OperationalStatus;
use crate::device::DeviceKind;
use crate::error::ValidationError;
use crate::id::{DeviceId, PropertyId};

/// What the caller wants the device to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[serde(alias = "activar")]
    Activate,
    #[serde(alias = "desactivar")]
    Deactivate,
}

impl Action {
    /// The operational status a device of `kind` ends up in.
    #[must_use]
    pub fn target_status(self, kind: DeviceKind) -> OperationalStatus {
        match (kind, self) {
            (DeviceKind::Lock, Self::Activate) => OperationalStatus::Open,
            (DeviceKind::Lock, Self::Deactivate) => OperationalStatus::Closed,
            (DeviceKind::Light, Self::Activate) => OperationalStatus::On,
            (DeviceKind::Light, Self::Deactivate) => OperationalStatus::Off,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activate => f.write_str("activate"),
            Self::Deactivate => f.write_str("deactivate"),
        }
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activate" | "activar" => Ok(Self::Activate),
            "deactivate" | "desactivar" => Ok(Self::Deactivate),
            other => Err(ValidationError::UnsupportedAction(other.to_string())),
        }
    }
}

/// A fully-resolved control request, whichever path it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCommand {
    pub property_id: PropertyId,
    pub device_id: DeviceId,
    pub action: Action,
}

impl ControlCommand {
    /// Build a command from raw boundary values.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the device id is blank or the
    /// action is not supported.
    pub fn parse(
        property_id: PropertyId,
        device_id: &str,
        action: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            property_id,
            device_id: DeviceId::new(device_id)?,
            action: action.parse()?,
        })
    }
}
