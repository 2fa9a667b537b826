//! # Offerdesk Testing
//!
//! Testing utilities and helpers for the Offerdesk reducer architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - In-memory and failing storage backends
//! - A recording event bus
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use offerdesk_testing::{test_clock, InMemoryStorage};
//! use offerdesk_runtime::{Store, StoreConfig};
//!
//! #[test]
//! fn test_order_value_is_persisted() {
//!     let storage = Arc::new(InMemoryStorage::new());
//!     let store = Store::with_persistence(
//!         AppState::default(),
//!         AppReducer::new(),
//!         env,
//!         storage.clone(),
//!         &StoreConfig::default(),
//!     );
//!
//!     store.send(AppAction::Calculator(CalculatorAction::SetOrderValue(20_000.0)))?;
//!     assert!(storage.contains_key("offerdesk-store"));
//! }
//! ```

use chrono::{DateTime, Utc};
use offerdesk_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
///
/// - `FixedClock`: Deterministic time
/// - `InMemoryStorage`: `HashMap`-backed
///   [`StateStorage`](offerdesk_core::environment::StateStorage)
/// - `FailingStorage`: Storage whose reads and writes always fail
/// - `RecordingEventBus`: Captures published events
pub mod mocks {
    #![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
    // Lock poisoning only happens after a test already panicked
    #![allow(clippy::missing_panics_doc)]

    use super::{Clock, DateTime, Utc};
    use offerdesk_core::environment::{StateStorage, StorageError};
    use offerdesk_core::event_bus::{validate_topic, BusEvent, EventBus, EventBusError};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible. The time can
    /// be moved forward explicitly with [`FixedClock::advance`].
    ///
    /// # Example
    ///
    /// ```
    /// use offerdesk_testing::mocks::FixedClock;
    /// use offerdesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Move the clock forward; every clone observes the new time
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.write().unwrap();
            *time += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// In-memory storage for fast, deterministic persistence tests.
    ///
    /// Clones share the same map, so a test can keep one handle for
    /// assertions while the store owns another.
    #[derive(Clone, Debug, Default)]
    pub struct InMemoryStorage {
        data: Arc<RwLock<HashMap<String, String>>>,
    }

    impl InMemoryStorage {
        /// Create a new empty in-memory storage
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a storage pre-seeded with `key = value`
        #[must_use]
        pub fn with_entry(key: &str, value: &str) -> Self {
            let storage = Self::new();
            storage
                .data
                .write()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            storage
        }

        /// Raw value stored under `key`
        #[must_use]
        pub fn raw(&self, key: &str) -> Option<String> {
            self.data.read().unwrap().get(key).cloned()
        }

        /// Stored value under `key`, parsed as JSON
        #[must_use]
        pub fn json(&self, key: &str) -> Option<serde_json::Value> {
            self.raw(key).and_then(|raw| serde_json::from_str(&raw).ok())
        }

        /// Check if a key exists in the storage
        #[must_use]
        pub fn contains_key(&self, key: &str) -> bool {
            self.data.read().unwrap().contains_key(key)
        }

        /// Clear all stored data (for test isolation)
        pub fn clear(&self) {
            self.data.write().unwrap().clear();
        }
    }

    impl StateStorage for InMemoryStorage {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.raw(key))
        }

        fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.data
                .write()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.data.write().unwrap().remove(key);
            Ok(())
        }
    }

    /// Storage whose every operation fails, for error-path tests
    #[derive(Clone, Debug, Default)]
    pub struct FailingStorage;

    impl StateStorage for FailingStorage {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read {
                key: key.to_string(),
                reason: "storage unavailable".to_string(),
            })
        }

        fn save(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            })
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                reason: "storage unavailable".to_string(),
            })
        }
    }

    /// Event bus that records every published event
    #[derive(Clone, Debug, Default)]
    pub struct RecordingEventBus {
        events: Arc<Mutex<Vec<BusEvent>>>,
    }

    impl RecordingEventBus {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// All recorded events, in publish order
        #[must_use]
        pub fn events(&self) -> Vec<BusEvent> {
            self.events.lock().unwrap().clone()
        }

        /// Recorded events for one topic
        #[must_use]
        pub fn events_for(&self, topic: &str) -> Vec<BusEvent> {
            self.events()
                .into_iter()
                .filter(|e| e.topic == topic)
                .collect()
        }

        /// Forget every recorded event
        pub fn clear(&self) {
            self.events.lock().unwrap().clear();
        }
    }

    impl EventBus for RecordingEventBus {
        fn publish(&self, event: BusEvent) -> Result<(), EventBusError> {
            validate_topic(&event.topic)?;
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }
}

/// Install a `tracing` subscriber that writes to the test output
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offerdesk=debug".into()),
        )
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FailingStorage, FixedClock, InMemoryStorage, RecordingEventBus};
