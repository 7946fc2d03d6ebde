use futures_util::SinkExt;
use tokio_tungstenite::connect_async;
use tungstenite::protocol::Message as WsMessage;

use crate::client::consumer::{WsConnection, wait_for_ack};
use crate::transport::message::ClientMessage;
use crate::utils::error::ClientError;

/// A publishing client: one connection, one request/ack exchange per publish.
pub struct Publisher {
    ws: WsConnection,
}

impl Publisher {
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let (ws, _) = connect_async(format!("ws://{addr}")).await?;
        Ok(Self { ws })
    }

    /// Publishes a payload to a topic and waits for the broker's ack.
    ///
    /// The returned bool is the broker's aggregate result: false means at
    /// least one subscriber delivery failed, not that nobody received the
    /// message. A topic with no subscribers acks true.
    pub async fn publish(&mut self, topic: &str, payload: &str) -> Result<bool, ClientError> {
        let frame = ClientMessage::Publish {
            topic: topic.to_string(),
            payload: payload.to_string(),
        };
        self.ws
            .send(WsMessage::text(serde_json::to_string(&frame)?))
            .await?;
        wait_for_ack(&mut self.ws).await
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.ws.close(None).await?;
        Ok(())
    }
}
