//! Property: a rental unit ("inmueble") that devices are attached to.

use serde::{Deserialize, Serialize};

use crate::error::{RentalError, ValidationError};
use crate::id::{PropertyId, UserId};
use crate::time::Timestamp;

/// A persisted rental unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    #[serde(flatten)]
    pub details: NewProperty,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The descriptive attributes of a property, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub room_number: Option<i32>,
    pub floor_number: Option<i32>,
    /// Monthly price in cents.
    pub price_cents: i64,
    pub occupied: bool,
    pub accessories: Option<serde_json::Value>,
    pub basic_services: Option<serde_json::Value>,
}

impl NewProperty {
    /// Create a builder for constructing a [`NewProperty`].
    #[must_use]
    pub fn builder(owner_id: UserId) -> NewPropertyBuilder {
        NewPropertyBuilder {
            owner_id,
            name: None,
            description: None,
            room_number: None,
            floor_number: None,
            price_cents: 0,
            occupied: false,
            accessories: None,
            basic_services: None,
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] when `name` is empty or the price
    /// is negative.
    pub fn validate(&self) -> Result<(), RentalError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.price_cents < 0 {
            return Err(ValidationError::NegativePrice.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`NewProperty`].
#[derive(Debug)]
pub struct NewPropertyBuilder {
    owner_id: UserId,
    name: Option<String>,
    description: Option<String>,
    room_number: Option<i32>,
    floor_number: Option<i32>,
    price_cents: i64,
    occupied: bool,
    accessories: Option<serde_json::Value>,
    basic_services: Option<serde_json::Value>,
}

impl NewPropertyBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn room_number(mut self, room_number: i32) -> Self {
        self.room_number = Some(room_number);
        self
    }

    #[must_use]
    pub fn floor_number(mut self, floor_number: i32) -> Self {
        self.floor_number = Some(floor_number);
        self
    }

    #[must_use]
    pub fn price_cents(mut self, price_cents: i64) -> Self {
        self.price_cents = price_cents;
        self
    }

    #[must_use]
    pub fn occupied(mut self, occupied: bool) -> Self {
        self.occupied = occupied;
        self
    }

    #[must_use]
    pub fn accessories(mut self, accessories: serde_json::Value) -> Self {
        self.accessories = Some(accessories);
        self
    }

    #[must_use]
    pub fn basic_services(mut self, basic_services: serde_json::Value) -> Self {
        self.basic_services = Some(basic_services);
        self
    }

    /// Consume the builder, validate, and return a [`NewProperty`].
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] if `name` is missing or empty, or
    /// the price is negative.
    pub fn build(self) -> Result<NewProperty, RentalError> {
        let property = NewProperty {
            owner_id: self.owner_id,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            room_number: self.room_number,
            floor_number: self.floor_number,
            price_cents: self.price_cents,
            occupied: self.occupied,
            accessories: self.accessories,
            basic_services: self.basic_services,
        };
        property.validate()?;
        Ok(property)
    }
}
