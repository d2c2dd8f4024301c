//! # rentalhub-domain
//!
//! Pure domain model for the rentalhub property/device control system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (door locks and lights) with their aggregate status
//! - Define **Properties** (rental units) and their **Owners**
//! - Define **Assignments** (property × device) carrying the operational status
//! - Define the **reconciliation rule** deriving a device status from an assignment
//! - Define **commands** (`activate` / `deactivate`) and the status they target
//! - Define **property events** broadcast to real-time subscribers
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod assignment;
pub mod command;
pub mod device;
pub mod event;
pub mod owner;
pub mod property;
pub mod reconciliation;
