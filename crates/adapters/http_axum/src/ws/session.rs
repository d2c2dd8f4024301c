//! Per-connection WebSocket state, independent of the socket itself.
//!
//! A [`Session`] owns the set of properties the connection joined. Each join
//! subscribes before reading the device snapshot and only starts forwarding
//! once the snapshot is queued, so the snapshot is always the first message
//! and no event raised during the join is lost. Events raised while the
//! snapshot was read may repeat state it already shows. Forwarding tasks are
//! aborted on leave and when the session is dropped.

use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use rentalhub_app::ports::{
    AssignmentRepository, DeviceRepository, OwnerRepository, PropertyRepository,
};
use rentalhub_domain::command::ControlCommand;
use rentalhub_domain::error::RentalError;
use rentalhub_domain::event::PropertyEvent;
use rentalhub_domain::id::PropertyId;

use super::protocol::{ClientMessage, Reply, ServerMessage};
use crate::state::AppState;

/// State of one WebSocket connection.
pub struct Session<DR, OR, PR, AR> {
    state: AppState<DR, OR, PR, AR>,
    outbound: mpsc::Sender<ServerMessage>,
    joined: HashMap<PropertyId, JoinHandle<()>>,
}

impl<DR, OR, PR, AR> Session<DR, OR, PR, AR>
where
    DR: DeviceRepository + Send + Sync + 'static,
    OR: OwnerRepository + Send + Sync + 'static,
    PR: PropertyRepository + Send + Sync + 'static,
    AR: AssignmentRepository + Send + Sync + 'static,
{
    /// Create a session pushing its frames into `outbound`.
    pub fn new(state: AppState<DR, OR, PR, AR>, outbound: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            state,
            outbound,
            joined: HashMap::new(),
        }
    }

    /// Properties this connection currently listens to, in ascending order.
    #[must_use]
    pub fn joined_properties(&self) -> Vec<PropertyId> {
        let mut ids: Vec<PropertyId> = self.joined.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Handle one text frame. Malformed frames are answered with an error.
    pub async fn handle_text(&mut self, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => self.handle(message).await,
            Err(err) => {
                tracing::debug!(%err, "malformed websocket frame");
                self.reply(ServerMessage::error(format!("malformed message: {err}")))
                    .await;
            }
        }
    }

    /// Handle one decoded client message.
    ///
    /// Failures are reported to this connection only.
    pub async fn handle(&mut self, message: ClientMessage) {
        let result = match message {
            ClientMessage::Join { property_id } => self.join(property_id).await,
            ClientMessage::Leave { property_id } => {
                self.leave(property_id);
                Ok(())
            }
            ClientMessage::Control {
                property_id,
                device_id,
                action,
            } => self.control(property_id, &device_id, &action).await,
        };

        if let Err(err) = result {
            self.reply(ServerMessage::error(err.to_string())).await;
        }
    }

    /// Answer a frame that could not be handled at all.
    pub async fn reject(&self, reason: &str) {
        self.reply(ServerMessage::error(reason)).await;
    }

    async fn join(&mut self, property_id: PropertyId) -> Result<(), RentalError> {
        self.state.property_service.get_property(property_id).await?;

        // buffered until the snapshot is queued
        let receiver = (!self.joined.contains_key(&property_id))
            .then(|| self.state.channels.subscribe(property_id));

        let devices = self
            .state
            .property_service
            .list_devices_for_property(property_id)
            .await?;
        self.reply(
            Reply::Devices {
                property_id,
                devices,
            }
            .into(),
        )
        .await;

        if let Some(receiver) = receiver {
            let task = tokio::spawn(forward(receiver, self.outbound.clone()));
            self.joined.insert(property_id, task);
            tracing::info!(%property_id, "joined property channel");
        }
        Ok(())
    }

    fn leave(&mut self, property_id: PropertyId) {
        if let Some(task) = self.joined.remove(&property_id) {
            task.abort();
            tracing::debug!(%property_id, "left property channel");
        }
    }

    async fn control(
        &mut self,
        property_id: PropertyId,
        device_id: &str,
        action: &str,
    ) -> Result<(), RentalError> {
        let command = ControlCommand::parse(property_id, device_id, action)?;
        let outcome = self.state.command_gateway.execute(command).await?;
        self.reply(Reply::ControlResult(outcome).into()).await;
        Ok(())
    }

    async fn reply(&self, message: ServerMessage) {
        if self.outbound.send(message).await.is_err() {
            tracing::debug!("connection closed before reply");
        }
    }
}

impl<DR, OR, PR, AR> Drop for Session<DR, OR, PR, AR> {
    fn drop(&mut self) {
        for (_, task) in self.joined.drain() {
            task.abort();
        }
    }
}

async fn forward(
    receiver: broadcast::Receiver<PropertyEvent>,
    outbound: mpsc::Sender<ServerMessage>,
) {
    let mut events = BroadcastStream::new(receiver);
    while let Some(item) = events.next().await {
        match item {
            Ok(event) => {
                if outbound.send(event.into()).await.is_err() {
                    break;
                }
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "websocket subscriber lagged, some events were dropped");
            }
        }
    }
}
