use crate::broker::Broker;
use crate::transport::message::ServerMessage;
use crate::transport::websocket::handle_frame;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

fn next_server_msg(rx: &mut mpsc::UnboundedReceiver<WsMessage>) -> ServerMessage {
    let frame = rx.try_recv().expect("expected a server frame");
    serde_json::from_str(frame.to_text().unwrap()).expect("frame should parse as ServerMessage")
}

#[test]
fn subscribe_frame_registers_the_sender() {
    let broker = Arc::new(Mutex::new(Broker::new()));
    let (tx, _rx) = mpsc::unbounded_channel();

    let msg = json!({
        "type": "subscribe",
        "topic": "news",
        "subscriber_id": "1"
    })
    .to_string();
    handle_frame(&broker, &tx, &msg);

    let broker = broker.lock().unwrap();
    assert!(broker.registry().contains("news", &"1".to_string()));
}

#[test]
fn unsubscribe_frame_acks_with_result() {
    let broker = Arc::new(Mutex::new(Broker::new()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let sub = json!({
        "type": "subscribe",
        "topic": "news",
        "subscriber_id": "1"
    })
    .to_string();
    let unsub = json!({
        "type": "unsubscribe",
        "topic": "news",
        "subscriber_id": "1"
    })
    .to_string();

    handle_frame(&broker, &tx, &sub);
    handle_frame(&broker, &tx, &unsub);
    match next_server_msg(&mut rx) {
        ServerMessage::Ack { success } => assert!(success),
        other => panic!("expected ack, got {:?}", other),
    }

    // Second unsubscribe for the same pair is not found.
    handle_frame(&broker, &tx, &unsub);
    match next_server_msg(&mut rx) {
        ServerMessage::Ack { success } => assert!(!success),
        other => panic!("expected ack, got {:?}", other),
    }
}

#[test]
fn publish_frame_delivers_and_acks() {
    let broker = Arc::new(Mutex::new(Broker::new()));
    let (sub_tx, mut sub_rx) = mpsc::unbounded_channel();
    let (pub_tx, mut pub_rx) = mpsc::unbounded_channel();

    let sub = json!({
        "type": "subscribe",
        "topic": "news",
        "subscriber_id": "1"
    })
    .to_string();
    handle_frame(&broker, &sub_tx, &sub);

    let publish = json!({
        "type": "publish",
        "topic": "news",
        "payload": "hello"
    })
    .to_string();
    handle_frame(&broker, &pub_tx, &publish);

    match next_server_msg(&mut pub_rx) {
        ServerMessage::Ack { success } => assert!(success),
        other => panic!("expected ack, got {:?}", other),
    }
    match next_server_msg(&mut sub_rx) {
        ServerMessage::Message { topic, payload, .. } => {
            assert_eq!(topic, "news");
            assert_eq!(payload, "hello");
        }
        other => panic!("expected message, got {:?}", other),
    }
}

#[test]
fn publish_to_severed_subscriber_acks_failure() {
    let broker = Arc::new(Mutex::new(Broker::new()));
    let (sub_tx, sub_rx) = mpsc::unbounded_channel();
    let (pub_tx, mut pub_rx) = mpsc::unbounded_channel();

    let sub = json!({
        "type": "subscribe",
        "topic": "news",
        "subscriber_id": "1"
    })
    .to_string();
    handle_frame(&broker, &sub_tx, &sub);
    drop(sub_rx);
    drop(sub_tx);

    let publish = json!({
        "type": "publish",
        "topic": "news",
        "payload": "hello"
    })
    .to_string();
    handle_frame(&broker, &pub_tx, &publish);

    match next_server_msg(&mut pub_rx) {
        ServerMessage::Ack { success } => assert!(!success),
        other => panic!("expected ack, got {:?}", other),
    }
    assert!(!broker.lock().unwrap().registry().contains("news", &"1".to_string()));
}

#[test]
fn invalid_frame_gets_an_error_reply() {
    let broker = Arc::new(Mutex::new(Broker::new()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    handle_frame(&broker, &tx, "{\"type\":\"nonsense\"}");
    match next_server_msg(&mut rx) {
        ServerMessage::Error { .. } => {}
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn client_message_round_trips_through_json() {
    let msg = json!({
        "type": "publish",
        "topic": "t",
        "payload": "p"
    })
    .to_string();
    let parsed: crate::transport::message::ClientMessage = serde_json::from_str(&msg).unwrap();
    match parsed {
        crate::transport::message::ClientMessage::Publish { topic, payload } => {
            assert_eq!(topic, "t");
            assert_eq!(payload, "p");
        }
        other => panic!("expected publish, got {:?}", other),
    }
}
