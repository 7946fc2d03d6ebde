use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;

pub type SubscriberId = String;

/// Key identifying one subscription: (topic, subscriber_id).
pub type SubscriptionKey = (String, SubscriberId);

/// One registered subscriber of one topic.
///
/// `sender` is the outbound stream handle: the channel drained by the
/// subscriber's connection task. `delivery_lock` serializes writes to that
/// stream so two fan-out passes can never interleave frames to the same
/// subscriber. The lock is created with the entry and dropped with it, so the
/// set of delivery locks always equals the set of registered entries.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub sender: UnboundedSender<WsMessage>,
    pub delivery_lock: Arc<Mutex<()>>,
}

impl Subscription {
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            sender,
            delivery_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Maps topic -> subscriber_id -> subscription.
///
/// The registry has no lock of its own: it is owned by the `Broker`, and the
/// broker lives behind one coarse `Mutex`. Every method here runs inside that
/// mutex's critical section, which is what keeps structural mutation,
/// fan-out iteration, and eviction consistent with each other. Delivery locks
/// are only ever taken inside the same critical section, so overwriting an
/// entry on re-subscribe can never discard a lock somebody still holds.
#[derive(Debug, Default)]
pub struct Registry {
    topics: HashMap<String, HashMap<SubscriberId, Subscription>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            topics: HashMap::new(),
        }
    }

    /// Inserts or overwrites the (topic, id) entry with a fresh, unlocked
    /// delivery lock. Re-subscribing the same id replaces the old stream
    /// handle; the old entry is dropped atomically with the replacement.
    pub fn register(&mut self, topic: &str, id: SubscriberId, sender: UnboundedSender<WsMessage>) {
        self.topics
            .entry(topic.to_string())
            .or_default()
            .insert(id, Subscription::new(sender));
    }

    /// Removes the (topic, id) entry and its delivery lock. Returns false
    /// without side effects if the entry does not exist.
    pub fn deregister(&mut self, topic: &str, id: &SubscriberId) -> bool {
        let Some(subscribers) = self.topics.get_mut(topic) else {
            return false;
        };
        let removed = subscribers.remove(id).is_some();
        if subscribers.is_empty() {
            self.topics.remove(topic);
        }
        removed
    }

    /// Point-in-time view of a topic's subscribers, used by fan-out. Empty
    /// for an unknown topic. Iteration order is map order: unspecified.
    pub fn snapshot(&self, topic: &str) -> Vec<(SubscriberId, Subscription)> {
        self.topics
            .get(topic)
            .map(|subscribers| {
                subscribers
                    .iter()
                    .map(|(id, sub)| (id.clone(), sub.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops every listed entry that is still present. Entries already
    /// removed by a racing explicit unsubscribe are skipped silently.
    pub fn evict_broken(&mut self, keys: &[SubscriptionKey]) {
        for (topic, id) in keys {
            self.deregister(topic, id);
        }
    }

    pub fn contains(&self, topic: &str, id: &SubscriberId) -> bool {
        self.topics
            .get(topic)
            .is_some_and(|subscribers| subscribers.contains_key(id))
    }

    /// Number of live subscribers on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, HashMap::len)
    }
}
