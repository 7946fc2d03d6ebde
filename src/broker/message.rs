use serde::{Deserialize, Serialize};

/// A published message as it travels from the broker to subscribers.
///
/// The payload is opaque to the broker: it is forwarded unchanged and no
/// schema is imposed. The timestamp is stamped (epoch milliseconds) when the
/// publish request is accepted.
///
/// Serializes as an internally tagged JSON object, e.g.
/// `{"type":"message","topic":"news","payload":"hi","timestamp":0}`, which is
/// the `message` frame of the wire protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename = "message")]
pub struct Message {
    pub topic: String,
    pub payload: String,
    pub timestamp: i64,
}

impl Message {
    /// Builds a message stamped with the current time.
    pub fn now(topic: String, payload: String) -> Self {
        Self {
            topic,
            payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
