use tracing::{debug, error, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::message::Message;
use crate::broker::registry::{Registry, SubscriberId, SubscriptionKey};

use tokio::sync::mpsc::UnboundedSender;

/// The broker core: the subscription registry plus the publish fan-out pass.
///
/// A `Broker` is constructed once at startup and shared as
/// `Arc<Mutex<Broker>>` with every connection task. That outer mutex is the
/// coarse lock of the design: it guards all registry structure and is held
/// for the whole of each fan-out pass, so publishes to the same topic never
/// interleave and the registry a publish iterates is exactly the registry at
/// the instant the lock was acquired.
#[derive(Debug, Default)]
pub struct Broker {
    registry: Registry,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Registers a subscriber's outbound stream for a topic. A later
    /// subscribe with the same (topic, id) overwrites the earlier entry.
    ///
    /// The registry entry stays until an explicit unsubscribe or until a
    /// publish observes the stream closed and evicts it; a subscriber whose
    /// connection died sits in the registry until the next publish to its
    /// topic.
    pub fn subscribe(&mut self, topic: &str, id: SubscriberId, sender: UnboundedSender<WsMessage>) {
        debug!("registering subscriber {} on topic '{}'", id, topic);
        self.registry.register(topic, id, sender);
    }

    /// Removes a subscription. Returns false if the (topic, id) pair was
    /// never registered (or was already evicted).
    pub fn unsubscribe(&mut self, topic: &str, id: &SubscriberId) -> bool {
        let removed = self.registry.deregister(topic, id);
        if removed {
            debug!("subscriber {} left topic '{}'", id, topic);
        }
        removed
    }

    /// Delivers a message to every current subscriber of its topic.
    ///
    /// Each delivery is attempted under that entry's delivery lock; a failed
    /// send marks the subscriber broken and moves on, so one dead stream
    /// never blocks delivery to the rest. Broken subscribers are evicted
    /// after the pass, before the coarse lock is released.
    ///
    /// Returns false if any delivery failed. The result is aggregate only:
    /// a false publish may still have reached every other subscriber, and a
    /// publish to a topic with no subscribers trivially succeeds.
    pub fn publish(&mut self, msg: Message) -> bool {
        let frame = match serde_json::to_string(&msg) {
            Ok(json) => WsMessage::text(json),
            Err(e) => {
                error!("failed to serialize message for '{}': {}", msg.topic, e);
                return false;
            }
        };

        let snapshot = self.registry.snapshot(&msg.topic);
        let mut broken: Vec<SubscriptionKey> = Vec::new();

        for (id, sub) in snapshot {
            // Coarse lock is already held by our caller; entry locks are
            // always nested inside it, in that order.
            let _delivery = sub.delivery_lock.lock().unwrap();
            if sub.sender.send(frame.clone()).is_err() {
                warn!(
                    "delivery to subscriber {} on topic '{}' failed, evicting",
                    id, msg.topic
                );
                broken.push((msg.topic.clone(), id));
            }
        }

        let clean = broken.is_empty();
        self.registry.evict_broken(&broken);
        clean
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
