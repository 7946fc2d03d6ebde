//! # streampub
//!
//! `streampub` is a minimalist, in-memory topic-based publish/subscribe
//! broker. Publishers send messages tagged with a topic string and the broker
//! fans each one out to every currently-registered subscriber of that topic
//! over a long-lived WebSocket stream per subscriber.
//!
//! ## Core Modules
//!
//! - `broker`: the subscription registry and the publish fan-out engine.
//! - `client`: `Consumer` and `Publisher` stubs over the wire protocol.
//! - `config`: loading and merging of server configuration.
//! - `transport`: the WebSocket server and the JSON frame protocol.
//! - `utils`: logging setup and client-side error types.
//!
//! There is no persistence and no replay: a message published while a
//! subscriber is absent (or after its delivery failed) is gone for that
//! subscriber.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;
