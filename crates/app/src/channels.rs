//! Per-property broadcast channels backed by tokio broadcast senders.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

use rentalhub_domain::error::RentalError;
use rentalhub_domain::event::PropertyEvent;
use rentalhub_domain::id::PropertyId;

use crate::ports::PropertyBroadcaster;

/// Topic-keyed registry: one [`broadcast`] channel per property.
///
/// Channels are created on first subscription. A channel whose receivers
/// are all gone is dropped on the next publish to it or the next
/// subscription to any property. Publishing to a property nobody listens
/// to is a no-op.
pub struct PropertyChannels {
    capacity: usize,
    topics: Mutex<HashMap<PropertyId, broadcast::Sender<PropertyEvent>>>,
}

impl PropertyChannels {
    /// Create a registry whose channels hold up to `capacity` pending events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to events of `property_id`.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self, property_id: PropertyId) -> broadcast::Receiver<PropertyEvent> {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        let before = topics.len();
        topics.retain(|id, sender| *id == property_id || sender.receiver_count() > 0);
        if topics.len() < before {
            tracing::debug!(dropped = before - topics.len(), "dropped idle property channels");
        }
        topics
            .entry(property_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of properties that currently hold a channel.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of live receivers on `property_id`.
    #[must_use]
    pub fn subscriber_count(&self, property_id: PropertyId) -> usize {
        let topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics
            .get(&property_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    fn send(&self, event: PropertyEvent) {
        let property_id = event.property_id();
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = topics.get(&property_id) else {
            return;
        };
        if sender.send(event).is_err() {
            // every receiver is gone
            topics.remove(&property_id);
            tracing::debug!(%property_id, "dropped idle property channel");
        }
    }
}

impl PropertyBroadcaster for PropertyChannels {
    fn publish(
        &self,
        event: PropertyEvent,
    ) -> impl Future<Output = Result<(), RentalError>> + Send {
        self.send(event);
        async { Ok(()) }
    }
}
