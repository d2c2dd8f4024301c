//! JSON frames exchanged over `/ws`.

use serde::{Deserialize, Serialize};

use rentalhub_app::services::command_gateway::CommandOutcome;
use rentalhub_app::services::property_service::PropertyDevice;
use rentalhub_domain::event::PropertyEvent;
use rentalhub_domain::id::PropertyId;

/// A frame sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to a property's channel and receive its device snapshot.
    Join { property_id: PropertyId },
    /// Stop receiving a property's events.
    Leave { property_id: PropertyId },
    /// Run a control command through the shared gateway.
    Control {
        property_id: PropertyId,
        device_id: String,
        action: String,
    },
}

/// A frame sent to the client.
///
/// Broadcast events keep their own `type` tag; replies addressed to this
/// connection only are tagged by [`Reply`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Event(PropertyEvent),
    Reply(Reply),
}

/// Frames addressed to the originating connection only.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Devices assigned to a property, sent after a join.
    Devices {
        property_id: PropertyId,
        devices: Vec<PropertyDevice>,
    },
    /// The connection's own command was applied.
    ControlResult(CommandOutcome),
    /// The connection's own frame was rejected.
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Reply(Reply::Error {
            message: message.into(),
        })
    }
}

impl From<PropertyEvent> for ServerMessage {
    fn from(event: PropertyEvent) -> Self {
        Self::Event(event)
    }
}

impl From<Reply> for ServerMessage {
    fn from(reply: Reply) -> Self {
        Self::Reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentalhub_domain::assignment::OperationalStatus;
    use rentalhub_domain::id::DeviceId;
    use serde_json::json;

    #[test]
    fn should_parse_client_frames() {
        let join: ClientMessage =
            serde_json::from_value(json!({"type": "join", "property_id": 7})).unwrap();
        assert_eq!(
            join,
            ClientMessage::Join {
                property_id: PropertyId::new(7)
            }
        );

        let control: ClientMessage = serde_json::from_value(json!({
            "type": "control",
            "property_id": 7,
            "device_id": "D1",
            "action": "activate",
        }))
        .unwrap();
        assert!(matches!(control, ClientMessage::Control { .. }));
    }

    #[test]
    fn should_reject_unknown_frame_type() {
        let result = serde_json::from_value::<ClientMessage>(json!({"type": "shout"}));
        assert!(result.is_err());
    }

    #[test]
    fn should_keep_event_tag_when_forwarding_broadcast() {
        let message = ServerMessage::from(PropertyEvent::DeviceStatus {
            property_id: PropertyId::new(1),
            device_id: DeviceId::new("D1").unwrap(),
            status: OperationalStatus::Open,
        });

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "device_status");
        assert_eq!(value["device_id"], "D1");
        assert_eq!(value["status"], "open");
    }

    #[test]
    fn should_tag_error_reply() {
        let value = serde_json::to_value(ServerMessage::error("nope")).unwrap();
        assert_eq!(value, json!({"type": "error", "message": "nope"}));
    }
}
