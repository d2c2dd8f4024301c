//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod assignment_service;
pub mod command_gateway;
pub mod device_service;
pub mod owner_service;
pub mod property_service;

#[cfg(test)]
pub(crate) mod testing;
