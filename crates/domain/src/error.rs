//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`RentalError`]
//! via `#[from]` (or an explicit `From` impl for boxed infrastructure errors).

use crate::assignment::OperationalStatus;
use crate::device::DeviceKind;

/// Top-level error returned by every domain and application operation.
#[derive(Debug, thiserror::Error)]
pub enum RentalError {
    /// Malformed or illegal input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// The relationship required to perform the operation is absent.
    #[error("{0}")]
    Forbidden(#[from] ForbiddenError),

    /// The store could not hand out a resource within its bound.
    #[error("resource exhausted")]
    ResourceExhausted(Box<dyn std::error::Error + Send + Sync>),

    /// Any other storage failure.
    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Input rejected by a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("invalid identifier `{0}`")]
    InvalidId(String),

    #[error("unknown device type `{0}`")]
    UnknownDeviceKind(String),

    #[error("unknown operational status `{0}`")]
    UnknownStatus(String),

    #[error("unsupported action `{0}`")]
    UnsupportedAction(String),

    #[error("role `{role}` does not match device type `{kind}`")]
    RoleMismatch { role: DeviceKind, kind: DeviceKind },

    #[error("status `{status}` is not legal for a `{kind}` device")]
    IllegalStatus {
        kind: DeviceKind,
        status: OperationalStatus,
    },

    #[error("device is assigned as `{assigned}` and cannot become `{requested}`")]
    KindConflict {
        assigned: DeviceKind,
        requested: DeviceKind,
    },

    #[error("hardware address `{0}` is already registered")]
    DuplicateHardwareAddress(String),

    #[error("price must not be negative")]
    NegativePrice,

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

/// A referenced entity could not be found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// An operation was attempted outside of the relationship that allows it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForbiddenError {
    #[error("device `{device_id}` is not assigned to property `{property_id}`")]
    NotAssigned {
        property_id: String,
        device_id: String,
    },
}
