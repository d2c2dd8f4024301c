//! # rentalhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `rentalhub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Write an assignment and its reconciled device status in one transaction
//!
//! ## Dependency rule
//! Depends on `rentalhub-app` (for port traits) and `rentalhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod assignment_repo;
mod device_repo;
mod error;
mod owner_repo;
mod pool;
mod property_repo;
mod row;

pub use assignment_repo::SqliteAssignmentRepository;
pub use device_repo::SqliteDeviceRepository;
pub use error::StorageError;
pub use owner_repo::SqliteOwnerRepository;
pub use pool::{Config, Database};
pub use property_repo::SqlitePropertyRepository;
