//! # Offerdesk Legacy Adapter
//!
//! Dotted-path access to the application state for callers written against
//! the old `get(path)` / `set(path, value)` / `subscribe(pattern, cb)` API.
//!
//! Writes never touch the state directly: each recognised path maps to one
//! or more typed actions sent through the store. Reads project the current
//! state to JSON. Subscriptions receive one [`ChangeEvent`] per changed leaf,
//! and every changed leaf is also published on the event bus under
//! `state:changed`.
//!
//! ## Example
//!
//! ```
//! use offerdesk_legacy::LegacyAdapter;
//! use offerdesk_core::environment::SystemClock;
//! use offerdesk_runtime::bus::InProcessEventBus;
//! use offerdesk_store::{in_memory_store, AppEnvironment};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = in_memory_store(AppEnvironment::new(Arc::new(SystemClock)));
//! let adapter = LegacyAdapter::new(store, Arc::new(InProcessEventBus::default()));
//!
//! adapter.set("calculator.orderValue", json!(75_000)).unwrap();
//! assert_eq!(
//!     adapter.get(Some("calculator.calculation.totalDiscount"), json!(0)),
//!     json!(11)
//! );
//! ```

mod adapter;
pub mod diff;
mod error;
pub mod path;
mod setters;

pub use adapter::{LegacyAdapter, PathSubscription, SetOutcome};
pub use diff::{ChangeEvent, LeafChange};
pub use error::LegacyError;
