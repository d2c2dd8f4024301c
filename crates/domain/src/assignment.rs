//! Assignment: the link between a property and a device.
//!
//! The assignment carries the *operational* status of the device within the
//! property (a lock is `open`/`closed`, a light is `on`/`off`) and the role
//! the device plays, which must always equal the device's kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceKind};
use crate::error::ValidationError;
use crate::id::{DeviceId, PropertyId};
use crate::time::{Timestamp, now};

/// Domain-specific state of an assigned device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalStatus {
    #[serde(alias = "abierta")]
    Open,
    #[serde(alias = "cerrada")]
    Closed,
    #[serde(alias = "encendida")]
    On,
    #[serde(alias = "apagada")]
    Off,
}

impl OperationalStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Whether this status belongs to the vocabulary of `kind`.
    #[must_use]
    pub fn is_legal_for(self, kind: DeviceKind) -> bool {
        matches!(
            (kind, self),
            (DeviceKind::Lock, Self::Open | Self::Closed) | (DeviceKind::Light, Self::On | Self::Off)
        )
    }

    /// The status a device of `kind` rests in when nothing was requested.
    #[must_use]
    pub fn resting(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Lock => Self::Closed,
            DeviceKind::Light => Self::Off,
        }
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" | "abierta" => Ok(Self::Open),
            "closed" | "cerrada" => Ok(Self::Closed),
            "on" | "encendida" => Ok(Self::On),
            "off" | "apagada" => Ok(Self::Off),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// A device attached to a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub property_id: PropertyId,
    pub device_id: DeviceId,
    pub role: DeviceKind,
    pub status: OperationalStatus,
    pub assigned_at: Timestamp,
    pub last_updated: Timestamp,
}

impl Assignment {
    /// Create a new assignment of `device` to `property_id`.
    ///
    /// When `status` is `None` the device starts in its resting status.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RoleMismatch`] when `role` differs from the
    /// device kind, or [`ValidationError::IllegalStatus`] when `status` is
    /// outside the device's vocabulary.
    pub fn new(
        property_id: PropertyId,
        device: &Device,
        role: DeviceKind,
        status: Option<OperationalStatus>,
    ) -> Result<Self, ValidationError> {
        let status = status.unwrap_or_else(|| OperationalStatus::resting(device.kind));
        let ts = now();
        let assignment = Self {
            property_id,
            device_id: device.id.clone(),
            role,
            status,
            assigned_at: ts,
            last_updated: ts,
        };
        assignment.validate_for(device.kind)?;
        Ok(assignment)
    }

    /// Check the role/type and vocabulary invariants against `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RoleMismatch`] or
    /// [`ValidationError::IllegalStatus`].
    pub fn validate_for(&self, kind: DeviceKind) -> Result<(), ValidationError> {
        if self.role != kind {
            return Err(ValidationError::RoleMismatch {
                role: self.role,
                kind,
            });
        }
        if !self.status.is_legal_for(kind) {
            return Err(ValidationError::IllegalStatus {
                kind,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Re-apply an assignment request on an existing row. `assigned_at` is kept.
    ///
    /// # Errors
    ///
    /// Same as [`Assignment::validate_for`].
    pub fn reassign(
        &mut self,
        device: &Device,
        role: DeviceKind,
        status: Option<OperationalStatus>,
    ) -> Result<(), ValidationError> {
        let mut next = self.clone();
        next.role = role;
        next.status = status.unwrap_or_else(|| OperationalStatus::resting(device.kind));
        next.last_updated = now();
        next.validate_for(device.kind)?;
        *self = next;
        Ok(())
    }

    /// Move to a new operational status after a control command.
    ///
    /// # Errors
    ///
    /// Same as [`Assignment::validate_for`].
    pub fn transition(
        &mut self,
        kind: DeviceKind,
        status: OperationalStatus,
    ) -> Result<(), ValidationError> {
        if !status.is_legal_for(kind) {
            return Err(ValidationError::IllegalStatus { kind, status });
        }
        self.status = status;
        self.last_updated = now();
        self.validate_for(kind)
    }
}
