//! # rentalhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository`: device registry persistence
//!   - `OwnerRepository` / `PropertyRepository`: property registry persistence
//!   - `AssignmentRepository`: the assignment ledger, including the atomic
//!     assignment + device-status write
//!   - `PropertyBroadcaster`: fan-out of property events
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DeviceService`: register, get, list
//!   - `OwnerService` / `PropertyService`: property registry
//!   - `AssignmentService`: assign devices to properties
//!   - `CommandGateway`: the single control path shared by HTTP and WebSocket
//! - Provide **in-process infrastructure** (per-property broadcast channels)
//!
//! ## Dependency rule
//! Depends on `rentalhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod channels;
pub mod ports;
pub mod services;
