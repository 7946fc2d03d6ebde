//! Client-side stubs: thin pass-throughs over the wire protocol.
//!
//! `Consumer` subscribes and buffers deliveries; `Publisher` publishes and
//! reports the broker's aggregate ack. Neither adds broker semantics of its
//! own.

pub mod consumer;
pub mod publisher;

pub use consumer::Consumer;
pub use publisher::Publisher;
