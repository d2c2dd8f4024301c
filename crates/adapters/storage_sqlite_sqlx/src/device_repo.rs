//! `SQLite` implementation of [`DeviceRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rentalhub_app::ports::DeviceRepository;
use rentalhub_domain::device::{Device, DeviceKind};
use rentalhub_domain::error::{NotFoundError, RentalError, ValidationError};
use rentalhub_domain::id::DeviceId;

use crate::error::StorageError;
use crate::row::{format_timestamp, parse, timestamp};

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Device> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let kind: String = row.try_get("kind")?;
        let status: String = row.try_get("status")?;
        let hardware_address: Option<String> = row.try_get("hardware_address")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Device::restore(
            parse::<DeviceId>(&id)?,
            parse(&kind)?,
            parse(&status)?,
            hardware_address,
            timestamp(&created_at)?,
            timestamp(&updated_at)?,
        )))
    }
}

const INSERT: &str = "INSERT INTO devices (id, kind, status, hardware_address, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM devices ORDER BY id";
const UPDATE_REGISTRATION: &str = "UPDATE devices SET kind = ?, hardware_address = ?, updated_at = ? WHERE id = ? AND NOT EXISTS (SELECT 1 FROM assignments WHERE device_id = ? AND role != ?)";
const SELECT_CONFLICTING_ROLE: &str =
    "SELECT role FROM assignments WHERE device_id = ? AND role != ? LIMIT 1";

/// `SQLite`-backed device repository.
#[derive(Clone)]
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// A second device claiming an already registered hardware address.
fn map_write_error(err: sqlx::Error, device: &Device) -> RentalError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
        && db.message().contains("hardware_address")
    {
        return ValidationError::DuplicateHardwareAddress(
            device.hardware_address.clone().unwrap_or_default(),
        )
        .into();
    }
    StorageError::from(err).into()
}

impl DeviceRepository for SqliteDeviceRepository {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(device.id.as_str())
                .bind(device.kind.as_str())
                .bind(device.status().as_str())
                .bind(device.hardware_address.as_deref())
                .bind(format_timestamp(&device.created_at))
                .bind(format_timestamp(&device.updated_at))
                .execute(&pool)
                .await
                .map_err(|err| map_write_error(err, &device))?;

            Ok(device)
        }
    }

    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, RentalError>> + Send {
        let pool = self.pool.clone();
        let id = id.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update_registration(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            // The assignment check rides in the UPDATE so that it cannot
            // interleave with a concurrent assignment write.
            let updated = sqlx::query(UPDATE_REGISTRATION)
                .bind(device.kind.as_str())
                .bind(device.hardware_address.as_deref())
                .bind(format_timestamp(&device.updated_at))
                .bind(device.id.as_str())
                .bind(device.id.as_str())
                .bind(device.kind.as_str())
                .execute(&pool)
                .await
                .map_err(|err| map_write_error(err, &device))?;

            if updated.rows_affected() == 0 {
                let assigned: Option<String> = sqlx::query_scalar(SELECT_CONFLICTING_ROLE)
                    .bind(device.id.as_str())
                    .bind(device.kind.as_str())
                    .fetch_optional(&pool)
                    .await
                    .map_err(StorageError::from)?;
                return Err(match assigned {
                    Some(role) => ValidationError::KindConflict {
                        assigned: parse::<DeviceKind>(&role).map_err(StorageError::from)?,
                        requested: device.kind,
                    }
                    .into(),
                    None => NotFoundError {
                        entity: "Device",
                        id: device.id.to_string(),
                    }
                    .into(),
                });
            }

            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(device.id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row).unwrap_or(device))
        }
    }
}
