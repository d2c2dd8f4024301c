//! Broadcast port: fan-out of property events to real-time subscribers.

use std::future::Future;

use rentalhub_domain::error::RentalError;
use rentalhub_domain::event::PropertyEvent;

/// Publishes an event to everyone subscribed to the event's property.
///
/// Delivery is fire-and-forget: no acknowledgement, no retry.
pub trait PropertyBroadcaster {
    fn publish(&self, event: PropertyEvent)
    -> impl Future<Output = Result<(), RentalError>> + Send;
}

impl<T: PropertyBroadcaster + Send + Sync> PropertyBroadcaster for std::sync::Arc<T> {
    fn publish(
        &self,
        event: PropertyEvent,
    ) -> impl Future<Output = Result<(), RentalError>> + Send {
        (**self).publish(event)
    }
}
