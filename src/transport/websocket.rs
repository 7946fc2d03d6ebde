use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::accept_async;
use tracing::{info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::{Arc, Mutex};

use crate::broker::{Broker, message::Message};
use crate::transport::message::{ClientMessage, ServerMessage};

/// Accepts WebSocket connections and serves them until the process exits.
///
/// Every connection gets its own task and its own outbound channel; the
/// broker is shared behind its coarse mutex.
pub async fn start_websocket_server(addr: &str, broker: Arc<Mutex<Broker>>) {
    let listener = TcpListener::bind(addr).await.expect("failed to bind");

    info!("broker listening on ws://{}", addr);

    while let Ok((stream, _)) = listener.accept().await {
        let broker = broker.clone();
        tokio::spawn(handle_connection(stream, broker));
    }
}

async fn handle_connection(stream: TcpStream, broker: Arc<Mutex<Broker>>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("websocket handshake failed: {}", e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Outbound channel for this connection. The broker's registry holds
    // clones of `tx` as stream handles; this task drains `rx` onto the
    // socket.
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    let forward = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(frame).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = ws_receiver.next().await {
        if !frame.is_text() {
            continue;
        }
        let Ok(text) = frame.to_text() else { continue };
        handle_frame(&broker, &tx, text);
    }

    // Connection gone. Abort the forwarder so the channel closes; registry
    // entries pointing at it are not touched here. The next publish to their
    // topics observes the dead stream and evicts them.
    forward.abort();
}

/// Dispatches one client frame against the broker.
///
/// Unsubscribe and publish are answered with an `ack` carrying their result;
/// subscribe opens the stream and answers with nothing but deliveries.
pub(crate) fn handle_frame(
    broker: &Arc<Mutex<Broker>>,
    tx: &UnboundedSender<WsMessage>,
    text: &str,
) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Subscribe {
            topic,
            subscriber_id,
        }) => {
            let mut broker = broker.lock().unwrap();
            broker.subscribe(&topic, subscriber_id.clone(), tx.clone());
            info!("{} subscribed to '{}'", subscriber_id, topic);
        }

        Ok(ClientMessage::Unsubscribe {
            topic,
            subscriber_id,
        }) => {
            let success = broker.lock().unwrap().unsubscribe(&topic, &subscriber_id);
            if !success {
                info!("{} was not subscribed to '{}'", subscriber_id, topic);
            }
            send_frame(tx, &ServerMessage::Ack { success });
        }

        Ok(ClientMessage::Publish { topic, payload }) => {
            let msg = Message::now(topic, payload);
            let success = broker.lock().unwrap().publish(msg);
            send_frame(tx, &ServerMessage::Ack { success });
        }

        Err(e) => {
            warn!("invalid client frame: {} | {}", e, text);
            send_frame(
                tx,
                &ServerMessage::Error {
                    message: format!("invalid frame: {e}"),
                },
            );
        }
    }
}

fn send_frame(tx: &UnboundedSender<WsMessage>, msg: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(msg) {
        let _ = tx.send(WsMessage::text(json));
    }
}
