//! `SQLite` implementation of [`AssignmentRepository`].
//!
//! [`write_reconciled`](AssignmentRepository::write_reconciled) runs the
//! device status update and the assignment upsert inside one transaction.
//! The transaction opens with a write guarded on the device kind, so
//! concurrent writers queue on `SQLite`'s write lock, a write derived from a
//! stale kind is rejected, and `last_updated` is stamped once the lock is
//! held. The last writer to commit carries the latest timestamp.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rentalhub_app::ports::AssignmentRepository;
use rentalhub_domain::assignment::Assignment;
use rentalhub_domain::device::DeviceKind;
use rentalhub_domain::error::{NotFoundError, RentalError, ValidationError};
use rentalhub_domain::id::{DeviceId, PropertyId};
use rentalhub_domain::reconciliation::ReconciledWrite;
use rentalhub_domain::time::now;

use crate::error::StorageError;
use crate::row::{format_timestamp, parse, timestamp};

struct Wrapper(Assignment);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let device_id: String = row.try_get("device_id")?;
        let role: String = row.try_get("role")?;
        let status: String = row.try_get("status")?;
        let assigned_at: String = row.try_get("assigned_at")?;
        let last_updated: String = row.try_get("last_updated")?;

        Ok(Self(Assignment {
            property_id: PropertyId::new(row.try_get("property_id")?),
            device_id: parse(&device_id)?,
            role: parse(&role)?,
            status: parse(&status)?,
            assigned_at: timestamp(&assigned_at)?,
            last_updated: timestamp(&last_updated)?,
        }))
    }
}

const SELECT_ONE: &str = "SELECT * FROM assignments WHERE property_id = ? AND device_id = ?";
const SELECT_BY_PROPERTY: &str =
    "SELECT * FROM assignments WHERE property_id = ? ORDER BY assigned_at, rowid";
const SELECT_BY_DEVICE: &str =
    "SELECT * FROM assignments WHERE device_id = ? ORDER BY assigned_at, rowid";
const SELECT_DEVICE_KIND: &str = "SELECT kind FROM devices WHERE id = ?";
// `max` keeps `last_updated` monotonic if the wall clock steps backwards.
const UPDATE_ASSIGNMENT: &str = "UPDATE assignments SET role = ?, status = ?, last_updated = max(?, last_updated) WHERE property_id = ? AND device_id = ?";
const INSERT_ASSIGNMENT: &str = "INSERT INTO assignments (property_id, device_id, role, status, assigned_at, last_updated) VALUES (?, ?, ?, ?, ?, ?)";
const UPDATE_DEVICE_STATUS: &str = "UPDATE devices SET status = ? WHERE id = ? AND kind = ?";
const TOUCH_DEVICE: &str = "UPDATE devices SET updated_at = ? WHERE id = ?";

/// `SQLite`-backed assignment ledger.
#[derive(Clone)]
pub struct SqliteAssignmentRepository {
    pool: SqlitePool,
}

impl SqliteAssignmentRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn db(err: sqlx::Error) -> RentalError {
    StorageError::from(err).into()
}

/// Explain why the kind-guarded status update matched no row.
async fn rejected_write(
    conn: &mut sqlx::SqliteConnection,
    write: &ReconciledWrite,
) -> Result<RentalError, sqlx::Error> {
    let assignment = write.assignment();
    let kind: Option<String> = sqlx::query_scalar(SELECT_DEVICE_KIND)
        .bind(assignment.device_id.as_str())
        .fetch_optional(conn)
        .await?;

    Ok(match kind {
        Some(kind) => ValidationError::RoleMismatch {
            role: assignment.role,
            kind: parse::<DeviceKind>(&kind)?,
        }
        .into(),
        None => NotFoundError {
            entity: "Device",
            id: assignment.device_id.to_string(),
        }
        .into(),
    })
}

async fn write_in_transaction(
    pool: &SqlitePool,
    write: &ReconciledWrite,
) -> Result<(Assignment, bool), RentalError> {
    let assignment = write.assignment();
    let property_id = assignment.property_id.get();
    let device_id = assignment.device_id.as_str();

    let mut tx = pool.begin().await.map_err(db)?;

    // First statement takes the write lock and re-checks the kind the
    // write was derived from.
    let guarded = sqlx::query(UPDATE_DEVICE_STATUS)
        .bind(write.device_status().as_str())
        .bind(device_id)
        .bind(assignment.role.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db)?;
    if guarded.rows_affected() == 0 {
        return Err(rejected_write(&mut tx, write).await.map_err(db)?);
    }

    let stamp = format_timestamp(&now());

    let updated = sqlx::query(UPDATE_ASSIGNMENT)
        .bind(assignment.role.as_str())
        .bind(assignment.status.as_str())
        .bind(&stamp)
        .bind(property_id)
        .bind(device_id)
        .execute(&mut *tx)
        .await
        .map_err(db)?;

    let created = updated.rows_affected() == 0;
    if created {
        sqlx::query(INSERT_ASSIGNMENT)
            .bind(property_id)
            .bind(device_id)
            .bind(assignment.role.as_str())
            .bind(assignment.status.as_str())
            .bind(&stamp)
            .bind(&stamp)
            .execute(&mut *tx)
            .await
            .map_err(db)?;
    }

    let stored: Wrapper = sqlx::query_as(SELECT_ONE)
        .bind(property_id)
        .bind(device_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db)?;

    sqlx::query(TOUCH_DEVICE)
        .bind(format_timestamp(&stored.0.last_updated))
        .bind(device_id)
        .execute(&mut *tx)
        .await
        .map_err(db)?;

    tx.commit().await.map_err(db)?;
    Ok((stored.0, created))
}

impl AssignmentRepository for SqliteAssignmentRepository {
    fn find(
        &self,
        property_id: PropertyId,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Assignment>, RentalError>> + Send {
        let pool = self.pool.clone();
        let device_id = device_id.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_ONE)
                .bind(property_id.get())
                .bind(device_id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn find_by_property(
        &self,
        property_id: PropertyId,
    ) -> impl Future<Output = Result<Vec<Assignment>, RentalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_PROPERTY)
                .bind(property_id.get())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn find_by_device(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<Vec<Assignment>, RentalError>> + Send {
        let pool = self.pool.clone();
        let device_id = device_id.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_DEVICE)
                .bind(device_id.as_str())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn write_reconciled(
        &self,
        write: ReconciledWrite,
    ) -> impl Future<Output = Result<(Assignment, bool), RentalError>> + Send {
        let pool = self.pool.clone();
        async move { write_in_transaction(&pool, &write).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_repo::SqliteDeviceRepository;
    use crate::owner_repo::SqliteOwnerRepository;
    use crate::pool::Config;
    use crate::property_repo::SqlitePropertyRepository;
    use rentalhub_app::ports::{DeviceRepository, OwnerRepository, PropertyRepository};
    use rentalhub_domain::assignment::OperationalStatus;
    use rentalhub_domain::device::{Device, DeviceKind, DeviceStatus};
    use rentalhub_domain::id::UserId;
    use rentalhub_domain::owner::NewOwner;
    use rentalhub_domain::property::NewProperty;
    use rentalhub_domain::reconciliation::reconcile;

    struct Fixture {
        repo: SqliteAssignmentRepository,
        devices: SqliteDeviceRepository,
        properties: SqlitePropertyRepository,
        owners: SqliteOwnerRepository,
        property_id: PropertyId,
        owner_id: UserId,
    }

    async fn setup() -> Fixture {
        setup_with(Config::default()).await
    }

    async fn setup_with(config: Config) -> Fixture {
        let db = config.build().await.unwrap();
        let pool = db.pool().clone();
        let owners = SqliteOwnerRepository::new(pool.clone());
        let properties = SqlitePropertyRepository::new(pool.clone());
        let devices = SqliteDeviceRepository::new(pool.clone());
        let owner = owners.create(NewOwner::new("Ana", "").unwrap()).await.unwrap();
        let property = properties
            .create(NewProperty::builder(owner.id).name("P1").build().unwrap())
            .await
            .unwrap();
        Fixture {
            repo: SqliteAssignmentRepository::new(pool),
            devices,
            properties,
            owners,
            property_id: property.id,
            owner_id: owner.id,
        }
    }

    async fn register(f: &Fixture, id: &str, kind: DeviceKind) -> Device {
        f.devices
            .create(Device::register(DeviceId::new(id).unwrap(), kind, None))
            .await
            .unwrap()
    }

    fn write(device: &Device, property_id: PropertyId, status: OperationalStatus) -> ReconciledWrite {
        let assignment = Assignment::new(property_id, device, device.kind, Some(status)).unwrap();
        ReconciledWrite::derive(device, assignment).unwrap()
    }

    async fn stored_status(f: &Fixture, id: &DeviceId) -> DeviceStatus {
        f.devices.get_by_id(id).await.unwrap().unwrap().status()
    }

    #[tokio::test]
    async fn should_insert_assignment_and_device_status_together() {
        let f = setup().await;
        let device = register(&f, "D1", DeviceKind::Lock).await;

        let (stored, created) = f
            .repo
            .write_reconciled(write(&device, f.property_id, OperationalStatus::Open))
            .await
            .unwrap();

        assert!(created);
        assert_eq!(stored.status, OperationalStatus::Open);
        assert_eq!(stored.role, DeviceKind::Lock);
        assert_eq!(stored_status(&f, &device.id).await, DeviceStatus::Active);
    }

    #[tokio::test]
    async fn should_update_existing_row_and_keep_assigned_at() {
        let f = setup().await;
        let device = register(&f, "L1", DeviceKind::Light).await;
        let (first, _) = f
            .repo
            .write_reconciled(write(&device, f.property_id, OperationalStatus::On))
            .await
            .unwrap();

        let mut next = first.clone();
        next.transition(DeviceKind::Light, OperationalStatus::Off)
            .unwrap();
        let (second, created) = f
            .repo
            .write_reconciled(ReconciledWrite::derive(&device, next).unwrap())
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(second.assigned_at, first.assigned_at);
        assert_eq!(second.status, OperationalStatus::Off);
        assert_eq!(f.repo.find_by_property(f.property_id).await.unwrap().len(), 1);
        assert_eq!(stored_status(&f, &device.id).await, DeviceStatus::Inactive);
    }

    #[tokio::test]
    async fn should_roll_back_when_device_row_is_missing() {
        let f = setup().await;
        let ghost = Device::register(DeviceId::new("ghost").unwrap(), DeviceKind::Lock, None);

        let result = f
            .repo
            .write_reconciled(write(&ghost, f.property_id, OperationalStatus::Open))
            .await;

        assert!(matches!(result, Err(RentalError::NotFound(_))));
        assert!(f.repo.find(f.property_id, &ghost.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_stamp_last_updated_in_commit_order() {
        let f = setup().await;
        let device = register(&f, "L1", DeviceKind::Light).await;
        // Built first, committed last.
        let earlier = write(&device, f.property_id, OperationalStatus::On);
        let later = write(&device, f.property_id, OperationalStatus::Off);

        let (second, _) = f.repo.write_reconciled(later).await.unwrap();
        let (last, created) = f.repo.write_reconciled(earlier).await.unwrap();

        assert!(!created);
        assert!(last.last_updated >= second.last_updated);
        let stored = f.repo.find(f.property_id, &device.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OperationalStatus::On);
        assert_eq!(stored.last_updated, last.last_updated);
        let device = f.devices.get_by_id(&device.id).await.unwrap().unwrap();
        assert_eq!(device.status(), DeviceStatus::Active);
        assert_eq!(device.updated_at, last.last_updated);
    }

    #[tokio::test]
    async fn should_reject_write_derived_from_stale_kind() {
        let f = setup().await;
        let stale = register(&f, "D1", DeviceKind::Lock).await;
        let pending = write(&stale, f.property_id, OperationalStatus::Open);

        let mut relabelled = stale.clone();
        relabelled.update_registration(DeviceKind::Light, None);
        f.devices.update_registration(relabelled).await.unwrap();

        let result = f.repo.write_reconciled(pending).await;

        assert!(matches!(
            result,
            Err(RentalError::Validation(ValidationError::RoleMismatch {
                role: DeviceKind::Lock,
                kind: DeviceKind::Light,
            }))
        ));
        assert!(f.repo.find(f.property_id, &stale.id).await.unwrap().is_none());
        assert_eq!(stored_status(&f, &stale.id).await, DeviceStatus::Inactive);
    }

    #[tokio::test]
    async fn should_serialize_concurrent_writes_on_shared_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("rentalhub.db").display());
        let f = setup_with(Config::with_url(url)).await;
        let device = register(&f, "D1", DeviceKind::Lock).await;

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let repo = f.repo.clone();
            let status = if i % 2 == 0 {
                OperationalStatus::Open
            } else {
                OperationalStatus::Closed
            };
            let pending = write(&device, f.property_id, status);
            tasks.spawn(async move { repo.write_reconciled(pending).await });
        }
        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            results.push(joined.unwrap().unwrap());
        }

        assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);
        let latest = results
            .iter()
            .map(|(stored, _)| stored.last_updated)
            .max()
            .unwrap();
        let stored = f.repo.find(f.property_id, &device.id).await.unwrap().unwrap();
        assert_eq!(stored.last_updated, latest);
        assert!(
            results
                .iter()
                .any(|(a, _)| a.last_updated == latest && a.status == stored.status)
        );
        let device = f.devices.get_by_id(&device.id).await.unwrap().unwrap();
        assert_eq!(device.status(), reconcile(DeviceKind::Lock, stored.status));
        assert_eq!(device.updated_at, stored.last_updated);
        assert_eq!(f.repo.find_by_property(f.property_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_list_property_assignments_oldest_first() {
        let f = setup().await;
        let d2 = register(&f, "D2", DeviceKind::Lock).await;
        let d1 = register(&f, "D1", DeviceKind::Lock).await;
        for device in [&d2, &d1] {
            f.repo
                .write_reconciled(write(device, f.property_id, OperationalStatus::Closed))
                .await
                .unwrap();
        }

        let ids: Vec<String> = f
            .repo
            .find_by_property(f.property_id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.device_id.to_string())
            .collect();
        assert_eq!(ids, ["D2", "D1"]);
    }

    #[tokio::test]
    async fn should_find_assignments_of_device_across_properties() {
        let f = setup().await;
        let device = register(&f, "D1", DeviceKind::Lock).await;
        let other = f
            .properties
            .create(NewProperty::builder(f.owner_id).name("P2").build().unwrap())
            .await
            .unwrap();
        for property_id in [f.property_id, other.id] {
            f.repo
                .write_reconciled(write(&device, property_id, OperationalStatus::Closed))
                .await
                .unwrap();
        }

        assert_eq!(f.repo.find_by_device(&device.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_cascade_assignments_but_keep_device_when_property_deleted() {
        let f = setup().await;
        let device = register(&f, "D1", DeviceKind::Lock).await;
        f.repo
            .write_reconciled(write(&device, f.property_id, OperationalStatus::Open))
            .await
            .unwrap();

        assert!(f.properties.delete(f.property_id).await.unwrap());

        assert!(f.repo.find(f.property_id, &device.id).await.unwrap().is_none());
        assert!(f.devices.get_by_id(&device.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn should_cascade_assignments_when_owner_deleted() {
        let f = setup().await;
        let device = register(&f, "D1", DeviceKind::Lock).await;
        f.repo
            .write_reconciled(write(&device, f.property_id, OperationalStatus::Closed))
            .await
            .unwrap();

        assert!(f.owners.delete(f.owner_id).await.unwrap());

        assert!(f.repo.find_by_device(&device.id).await.unwrap().is_empty());
    }
}
