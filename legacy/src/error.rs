//! Errors of the legacy path adapter.

use offerdesk_core::event_bus::EventBusError;
use offerdesk_runtime::StoreError;
use thiserror::Error;

/// Errors returned by [`crate::LegacyAdapter`]
#[derive(Error, Debug)]
pub enum LegacyError {
    /// A recognised path received a value of the wrong shape
    #[error("Invalid value for '{path}': {reason}")]
    InvalidValue {
        /// Path that was set
        path: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The store rejected the resulting action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The event bus rejected an event
    #[error(transparent)]
    Bus(#[from] EventBusError),

    /// The state could not be projected to JSON
    #[error("Failed to project state: {0}")]
    Projection(#[from] serde_json::Error),
}

impl LegacyError {
    pub(crate) fn invalid(path: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidValue {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
