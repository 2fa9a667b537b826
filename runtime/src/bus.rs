//! In-process event bus backed by a `tokio` broadcast channel.
//!
//! Publishing is synchronous (`broadcast::Sender::send` never blocks), so the
//! bus can be driven from inside store listeners. Receivers may consume
//! events either asynchronously with [`TopicSubscription::recv`] or by
//! polling with [`TopicSubscription::try_recv`].

use offerdesk_core::event_bus::{validate_topic, BusEvent, EventBus, EventBusError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Default number of buffered events per receiver
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Broadcast event bus shared by every component of one process
#[derive(Debug, Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl InProcessEventBus {
    /// Create a bus whose receivers buffer up to `capacity` events
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to the given topics; an empty slice subscribes to everything
    #[must_use]
    pub fn subscribe(&self, topics: &[&str]) -> TopicSubscription {
        TopicSubscription {
            receiver: self.sender.subscribe(),
            topics: topics.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    /// Number of live subscriptions
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl EventBus for InProcessEventBus {
    fn publish(&self, event: BusEvent) -> Result<(), EventBusError> {
        validate_topic(&event.topic)?;
        metrics::counter!("event_bus.messages.published").increment(1);

        // No receivers is fine: nobody is listening yet.
        if self.sender.send(event).is_err() {
            tracing::trace!("Event published with no subscribers");
        }
        Ok(())
    }
}

/// Receiver filtered to a set of topics
#[derive(Debug)]
pub struct TopicSubscription {
    receiver: broadcast::Receiver<BusEvent>,
    topics: Vec<String>,
}

impl TopicSubscription {
    fn wants(&self, event: &BusEvent) -> bool {
        self.topics.is_empty() || self.topics.iter().any(|t| *t == event.topic)
    }

    /// Wait for the next matching event, `None` once the bus is dropped
    pub async fn recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.wants(&event) => return Some(event),
                Ok(_) => {},
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Bus subscriber lagged, events dropped");
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next matching event if one is already buffered
    pub fn try_recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.wants(&event) => return Some(event),
                Ok(_) => {},
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Bus subscriber lagged, events dropped");
                },
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every buffered matching event
    pub fn drain(&mut self) -> Vec<BusEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
