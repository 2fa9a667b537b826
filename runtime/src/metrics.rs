//! Metric descriptions for the store runtime.
//!
//! The runtime records through the `metrics` facade only. Hosts that want the
//! numbers install a recorder of their choice and call [`register_metrics`]
//! once so that every series carries a description.
//!
//! # Series
//!
//! - `store.actions.total`: actions dispatched through `Store::send`
//! - `store.reducer.duration_seconds`: time spent inside the reducer
//! - `store.listeners.notified`: listener invocations after a commit
//! - `store.persistence.writes`: snapshots written to storage
//! - `store.persistence.failures`: snapshot writes or reads that failed
//! - `event_bus.messages.published`: bus events accepted for delivery

use metrics::{describe_counter, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "store.actions.total",
        "Total number of actions dispatched to the store"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time taken to run the reducer for one action"
    );
    describe_counter!(
        "store.listeners.notified",
        "Total number of listener invocations after state commits"
    );
    describe_counter!(
        "store.persistence.writes",
        "Total number of persisted snapshots written"
    );
    describe_counter!(
        "store.persistence.failures",
        "Total number of failed snapshot reads or writes"
    );
    describe_counter!(
        "event_bus.messages.published",
        "Total number of messages published to the in-process event bus"
    );
}
