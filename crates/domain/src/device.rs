//! Device: a physical lock or light that can be attached to properties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RentalError, ValidationError};
use crate::id::DeviceId;
use crate::time::{Timestamp, now};

/// What a device physically is. Assignment roles use the same vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[serde(alias = "chapa")]
    Lock,
    #[serde(alias = "luz")]
    Light,
}

impl DeviceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lock" | "chapa" => Ok(Self::Lock),
            "light" | "luz" => Ok(Self::Light),
            other => Err(ValidationError::UnknownDeviceKind(other.to_string())),
        }
    }
}

/// Device-level summary derived from its assignment's operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    #[default]
    Inactive,
}

impl DeviceStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// A registered lock or light.
///
/// The aggregate `status` has no public setter: it starts `inactive` and is
/// afterwards only written through
/// [`ReconciledWrite`](crate::reconciliation::ReconciledWrite).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    status: DeviceStatus,
    pub hardware_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Device {
    /// A freshly registered device, always `inactive`.
    #[must_use]
    pub fn register(id: DeviceId, kind: DeviceKind, hardware_address: Option<String>) -> Self {
        let ts = now();
        Self {
            id,
            kind,
            status: DeviceStatus::Inactive,
            hardware_address: normalize_address(hardware_address),
            created_at: ts,
            updated_at: ts,
        }
    }

    /// Rebuild a device from persisted columns.
    #[must_use]
    pub fn restore(
        id: DeviceId,
        kind: DeviceKind,
        status: DeviceStatus,
        hardware_address: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            kind,
            status,
            hardware_address,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    /// Apply re-registration metadata. The aggregate status is untouched.
    pub fn update_registration(&mut self, kind: DeviceKind, hardware_address: Option<String>) {
        self.kind = kind;
        self.hardware_address = normalize_address(hardware_address);
        self.updated_at = now();
    }

    pub(crate) fn set_status(&mut self, status: DeviceStatus) {
        self.status = status;
    }

    /// Parse a device kind coming from an untyped boundary.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] when `kind` is not `lock` or `light`.
    pub fn parse_kind(kind: &str) -> Result<DeviceKind, RentalError> {
        Ok(kind.parse()?)
    }
}

fn normalize_address(address: Option<String>) -> Option<String> {
    address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}
