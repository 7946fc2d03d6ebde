//! Network-facing layer: the WebSocket server and the JSON frame protocol
//! spoken between clients and the broker.
//!
//! The transport owns connection lifecycles. The broker itself never sees a
//! socket; it sees per-connection channels, and a closed channel is how a
//! dead connection eventually surfaces to it.

pub mod message;
pub mod websocket;

#[cfg(test)]
mod tests;
