use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::message::Message;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::error::ClientError;

pub(crate) type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TopicStream {
    cancel: Arc<Notify>,
    task: JoinHandle<()>,
}

/// A subscribing client.
///
/// Each subscribed topic gets its own connection and its own receive loop;
/// the loop appends every delivered message to a shared, ordered buffer
/// until it is cancelled or the stream dies. A dead stream ends the loop
/// silently; there is no automatic reconnection.
pub struct Consumer {
    id: String,
    addr: String,
    subscriptions: HashMap<String, TopicStream>,
    messages: Arc<Mutex<Vec<Message>>>,
}

impl Consumer {
    pub fn new(addr: &str) -> Self {
        Self {
            id: format!("consumer-{}", Uuid::new_v4()),
            addr: addr.to_string(),
            subscriptions: HashMap::new(),
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Opens a stream for `topic` and starts its receive loop. Subscribing
    /// to a topic this consumer already follows is a no-op.
    pub async fn subscribe(&mut self, topic: &str) -> Result<(), ClientError> {
        if self.subscriptions.contains_key(topic) {
            return Ok(());
        }

        let (mut ws, _) = connect_async(format!("ws://{}", self.addr)).await?;
        let frame = ClientMessage::Subscribe {
            topic: topic.to_string(),
            subscriber_id: self.id.clone(),
        };
        ws.send(WsMessage::text(serde_json::to_string(&frame)?))
            .await?;

        let cancel = Arc::new(Notify::new());
        let task = tokio::spawn(receive_loop(
            ws,
            self.messages.clone(),
            cancel.clone(),
        ));
        self.subscriptions
            .insert(topic.to_string(), TopicStream { cancel, task });
        Ok(())
    }

    /// Cancels the topic's receive loop and tells the broker to drop the
    /// subscription. Returns the broker's answer: false when the broker no
    /// longer knew the pair (e.g. it was already evicted), or when this
    /// consumer never subscribed locally.
    pub async fn unsubscribe(&mut self, topic: &str) -> Result<bool, ClientError> {
        let Some(stream) = self.subscriptions.remove(topic) else {
            return Ok(false);
        };

        stream.cancel.notify_one();
        let _ = stream.task.await;

        self.broker_unsubscribe(topic).await
    }

    /// Unsubscribes from every topic. Broker-side not-found answers are
    /// ignored here; the consumer is going away either way.
    pub async fn close(mut self) -> Result<(), ClientError> {
        let topics: Vec<String> = self.subscriptions.keys().cloned().collect();
        for topic in topics {
            let _ = self.unsubscribe(&topic).await;
        }
        Ok(())
    }

    /// Snapshot of every message received so far, in arrival order.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    // One short-lived control connection per unsubscribe; the subscription's
    // own stream is already being torn down at this point.
    async fn broker_unsubscribe(&self, topic: &str) -> Result<bool, ClientError> {
        let (mut ws, _) = connect_async(format!("ws://{}", self.addr)).await?;
        let frame = ClientMessage::Unsubscribe {
            topic: topic.to_string(),
            subscriber_id: self.id.clone(),
        };
        ws.send(WsMessage::text(serde_json::to_string(&frame)?))
            .await?;

        let success = wait_for_ack(&mut ws).await?;
        let _ = ws.close(None).await;
        Ok(success)
    }
}

async fn receive_loop(
    mut ws: WsConnection,
    messages: Arc<Mutex<Vec<Message>>>,
    cancel: Arc<Notify>,
) {
    loop {
        tokio::select! {
            _ = cancel.notified() => {
                let _ = ws.close(None).await;
                break;
            }
            frame = ws.next() => {
                match frame {
                    Some(Ok(frame)) if frame.is_text() => {
                        let Ok(text) = frame.to_text() else { continue };
                        if let Ok(ServerMessage::Message { topic, payload, timestamp }) =
                            serde_json::from_str::<ServerMessage>(text)
                        {
                            messages.lock().unwrap().push(Message {
                                topic,
                                payload,
                                timestamp,
                            });
                        }
                    }
                    Some(Ok(_)) => {}
                    // Stream closed or errored: exit quietly.
                    _ => {
                        debug!("subscription stream ended");
                        break;
                    }
                }
            }
        }
    }
}

pub(crate) async fn wait_for_ack(ws: &mut WsConnection) -> Result<bool, ClientError> {
    while let Some(frame) = ws.next().await {
        let frame = frame?;
        if !frame.is_text() {
            continue;
        }
        let Ok(text) = frame.to_text() else { continue };
        if let Ok(ServerMessage::Ack { success }) = serde_json::from_str::<ServerMessage>(text) {
            return Ok(success);
        }
    }
    Err(ClientError::ConnectionClosed)
}
