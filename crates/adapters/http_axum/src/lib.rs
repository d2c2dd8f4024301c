//! # rentalhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for the device registry, the property registry,
//!   device assignment and synchronous device control
//!   (`/api/devices`, `/api/owners`, `/api/properties`, …)
//! - Serve the **persistent WebSocket channel** (`/ws`): per-connection
//!   property subscriptions, snapshots and control commands
//! - Map HTTP requests and WebSocket frames into application service calls
//!   (driving adapter)
//!
//! Both entry paths hand control commands to the same
//! `CommandGateway::execute`; they only differ in how the outcome is reported.
//!
//! ## Dependency rule
//! Depends on `rentalhub-app` (for port traits and services) and
//! `rentalhub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
pub mod ws;

#[cfg(test)]
pub(crate) mod testing;
