//! Owner: the user a property belongs to.

use serde::{Deserialize, Serialize};

use crate::error::{RentalError, ValidationError};
use crate::id::UserId;

/// A persisted property owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Owner attributes before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOwner {
    pub name: String,
    pub email: String,
}

impl NewOwner {
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] when `name` is empty.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, RentalError> {
        let owner = Self {
            name: name.into(),
            email: email.into(),
        };
        if owner.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(owner)
    }
}
