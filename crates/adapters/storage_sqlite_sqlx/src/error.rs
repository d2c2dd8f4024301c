//! Storage-specific error type wrapping sqlx errors.

use rentalhub_domain::error::RentalError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to (de)serialize a stored JSON value.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for RentalError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                Self::ResourceExhausted(Box::new(err))
            }
            other => Self::Storage(Box::new(other)),
        }
    }
}
