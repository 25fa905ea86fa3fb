use super::{DeliveryMode, Subscription, Topic, Transport, TransportError};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// In-process bus: every publish is copied to every live subscriber of its topic.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    subscribers: Mutex<HashMap<Topic, Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscribers still listening on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        let subscribers = self.subscribers.lock();
        subscribers
            .get(&topic)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }
}

impl Transport for LoopbackTransport {
    fn publish(
        &self,
        topic: Topic,
        payload: &[u8],
        _mode: DeliveryMode,
    ) -> Result<(), TransportError> {
        let mut subscribers = self.subscribers.lock();
        if let Some(senders) = subscribers.get_mut(&topic) {
            // Dropped receivers are pruned on the way.
            senders.retain(|sender| sender.send(payload.to_vec()).is_ok());
        }
        Ok(())
    }

    fn subscribe(&self, topic: Topic) -> Result<Subscription, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().entry(topic).or_default().push(tx);
        Ok(rx)
    }
}
