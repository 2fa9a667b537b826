//! Event bus abstraction for in-process broadcast of named topics.
//!
//! The legacy integration layer announces state changes on a global bus using
//! string topics (`state:changed`, `state:initialized`). This module defines
//! the contract; the runtime ships an in-process implementation and the
//! testing crate a recording one.
//!
//! # Delivery
//!
//! - Publishing is synchronous and never blocks on subscribers
//! - Publishing with no subscribers is not an error
//! - Payloads are JSON values so that untyped legacy listeners can consume them
//!
//! # Example
//!
//! ```rust,ignore
//! use offerdesk_core::event_bus::{BusEvent, EventBus};
//!
//! fn announce(bus: &impl EventBus) -> Result<(), EventBusError> {
//!     bus.publish(BusEvent::new("state:initialized", serde_json::Value::Null))
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Topic emitted for every changed leaf of the state tree
pub const STATE_CHANGED: &str = "state:changed";

/// Topic emitted once after the legacy adapter has been initialized
pub const STATE_INITIALIZED: &str = "state:initialized";

/// Errors that can occur during event bus operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventBusError {
    /// Failed to publish an event to a topic
    #[error("Publish failed for topic '{topic}': {reason}")]
    PublishFailed {
        /// The topic that failed
        topic: String,
        /// The reason for failure
        reason: String,
    },

    /// Topic name is empty or otherwise invalid
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),
}

/// A message published on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    /// Topic name, e.g. `state:changed`
    pub topic: String,
    /// Event payload
    pub payload: serde_json::Value,
}

impl BusEvent {
    /// Create a new event for `topic`
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

/// Synchronous publisher of [`BusEvent`]s
pub trait EventBus: Send + Sync {
    /// Publish `event` to every current subscriber of its topic
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::InvalidTopic`] for an empty topic, or
    /// [`EventBusError::PublishFailed`] if the backend rejects the event.
    fn publish(&self, event: BusEvent) -> Result<(), EventBusError>;
}

/// Validate a topic name before publishing
///
/// # Errors
///
/// Returns [`EventBusError::InvalidTopic`] when `topic` is empty or blank.
pub fn validate_topic(topic: &str) -> Result<(), EventBusError> {
    if topic.trim().is_empty() {
        return Err(EventBusError::InvalidTopic(topic.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_topics_are_rejected() {
        assert_eq!(
            validate_topic("  "),
            Err(EventBusError::InvalidTopic("  ".to_string()))
        );
        assert!(validate_topic(STATE_CHANGED).is_ok());
    }
}
