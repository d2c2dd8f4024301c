//! Shared application state for axum handlers.

use std::sync::Arc;

use rentalhub_app::channels::PropertyChannels;
use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};
use rentalhub_app::services::assignment_service::AssignmentService;
use rentalhub_app::services::command_gateway::CommandGateway;
use rentalhub_app::services::device_service::DeviceService;
use rentalhub_app::services::owner_service::OwnerService;
use rentalhub_app::services::property_service::PropertyService;

/// Broadcaster used by every service that publishes property events.
pub type Channels = Arc<PropertyChannels>;

/// Application state shared across all axum handlers and WebSocket sessions.
///
/// Generic over the repository types to avoid dynamic dispatch.
/// `Clone` is implemented manually so only the `Arc` wrappers are cloned.
pub struct AppState<DR, OR, PR, AR> {
    /// Device registry.
    pub device_service: Arc<DeviceService<DR>>,
    /// Owner registry.
    pub owner_service: Arc<OwnerService<OR>>,
    /// Property registry and per-property device listing.
    pub property_service: Arc<PropertyService<PR, OR, DR, AR>>,
    /// Direct device assignment.
    pub assignment_service: Arc<AssignmentService<PR, DR, AR, Channels>>,
    /// The single control path shared by HTTP and WebSocket.
    pub command_gateway: Arc<CommandGateway<DR, AR, Channels>>,
    /// Per-property broadcast registry the WebSocket sessions subscribe to.
    pub channels: Channels,
}

impl<DR, OR, PR, AR> Clone for AppState<DR, OR, PR, AR> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            owner_service: Arc::clone(&self.owner_service),
            property_service: Arc::clone(&self.property_service),
            assignment_service: Arc::clone(&self.assignment_service),
            command_gateway: Arc::clone(&self.command_gateway),
            channels: Arc::clone(&self.channels),
        }
    }
}

impl<DR, OR, PR, AR> AppState<DR, OR, PR, AR>
where
    DR: DeviceRepository + Clone + Send + Sync + 'static,
    OR: OwnerRepository + Clone + Send + Sync + 'static,
    PR: PropertyRepository + Clone + Send + Sync + 'static,
    AR: AssignmentRepository + Clone + Send + Sync + 'static,
{
    /// Wire every service from the repositories and the channel registry.
    pub fn new(devices: DR, owners: OR, properties: PR, assignments: AR, channels: Channels) -> Self {
        Self {
            device_service: Arc::new(DeviceService::new(devices.clone())),
            owner_service: Arc::new(OwnerService::new(owners.clone())),
            property_service: Arc::new(PropertyService::new(
                properties.clone(),
                owners,
                devices.clone(),
                assignments.clone(),
            )),
            assignment_service: Arc::new(AssignmentService::new(
                properties,
                devices.clone(),
                assignments.clone(),
                Arc::clone(&channels),
            )),
            command_gateway: Arc::new(CommandGateway::new(
                devices,
                assignments,
                Arc::clone(&channels),
            )),
            channels,
        }
    }
}
