use serde::{Deserialize, Serialize};

/// Frames a client may send to the broker.
///
/// The subscriber identity is chosen by the client and supplied on every
/// subscribe/unsubscribe; the broker does not enforce uniqueness beyond
/// "a later subscribe with the same (topic, subscriber_id) wins".
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "subscribe")]
    Subscribe {
        topic: String,
        subscriber_id: String,
    },

    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        topic: String,
        subscriber_id: String,
    },

    #[serde(rename = "publish")]
    Publish { topic: String, payload: String },
}

/// Frames the broker sends back.
///
/// `Message` frames carry fan-out deliveries (the broker serializes
/// `broker::message::Message` directly; the JSON is identical). `Ack`
/// answers unsubscribe and publish requests with their aggregate result.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "message")]
    Message {
        topic: String,
        payload: String,
        timestamp: i64,
    },

    #[serde(rename = "ack")]
    Ack { success: bool },

    #[serde(rename = "error")]
    Error { message: String },
}
