//! Shared fixtures for handler and session tests, backed by in-memory `SQLite`.

use std::sync::Arc;

use rentalhub_adapter_storage_sqlite_sqlx::{
    Config, SqliteAssignmentRepository, SqliteDeviceRepository, SqliteOwnerRepository,
    SqlitePropertyRepository,
};
use rentalhub_app::channels::PropertyChannels;
use rentalhub_domain::assignment::OperationalStatus;
use rentalhub_domain::device::DeviceKind;
use rentalhub_domain::id::{DeviceId, PropertyId};
use rentalhub_domain::owner::NewOwner;
use rentalhub_domain::property::NewProperty;

use crate::state::AppState;

pub(crate) type Devices = SqliteDeviceRepository;
pub(crate) type Owners = SqliteOwnerRepository;
pub(crate) type Properties = SqlitePropertyRepository;
pub(crate) type Assignments = SqliteAssignmentRepository;
pub(crate) type TestState = AppState<Devices, Owners, Properties, Assignments>;

pub(crate) async fn state() -> TestState {
    let db = Config::default().build().await.unwrap();
    let pool = db.pool().clone();
    AppState::new(
        SqliteDeviceRepository::new(pool.clone()),
        SqliteOwnerRepository::new(pool.clone()),
        SqlitePropertyRepository::new(pool.clone()),
        SqliteAssignmentRepository::new(pool),
        Arc::new(PropertyChannels::new(16)),
    )
}

/// A property owning lock `D1`, assigned `closed`.
pub(crate) async fn state_with_assigned_lock() -> (TestState, PropertyId) {
    let state = state().await;
    let owner = state
        .owner_service
        .create_owner(NewOwner::new("Ana", "ana@example.com").unwrap())
        .await
        .unwrap();
    let property = state
        .property_service
        .create_property(NewProperty::builder(owner.id).name("P1").build().unwrap())
        .await
        .unwrap();
    state
        .device_service
        .register_device(DeviceId::new("D1").unwrap(), DeviceKind::Lock, None)
        .await
        .unwrap();
    state
        .assignment_service
        .assign_device(
            property.id,
            DeviceId::new("D1").unwrap(),
            DeviceKind::Lock,
            Some(OperationalStatus::Closed),
        )
        .await
        .unwrap();
    (state, property.id)
}

pub(crate) async fn register_light(state: &TestState, id: &str) {
    state
        .device_service
        .register_device(DeviceId::new(id).unwrap(), DeviceKind::Light, None)
        .await
        .unwrap();
}
