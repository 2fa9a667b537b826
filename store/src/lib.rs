//! # Offerdesk Store
//!
//! The application state of Offerdesk: nine slices, the actions that mutate
//! them, and the persisted projection that survives restarts.
//!
//! Nothing mutates the state except an [`AppAction`] sent through the
//! [`AppStore`]. Each slice has its own reducer; slices never read each other,
//! and cross-slice behavior is expressed by sending several actions.
//!
//! ## Example
//!
//! ```
//! use offerdesk_store::{open_store, AppAction, AppEnvironment, CalculatorAction, ScenarioInput};
//! use offerdesk_store::selectors;
//! use offerdesk_core::environment::SystemClock;
//! use offerdesk_runtime::StoreConfig;
//! use offerdesk_testing::InMemoryStorage;
//! use std::sync::Arc;
//!
//! let store = open_store(
//!     AppEnvironment::new(Arc::new(SystemClock)),
//!     Arc::new(InMemoryStorage::new()),
//!     &StoreConfig::default(),
//! );
//!
//! store
//!     .send(AppAction::Calculator(CalculatorAction::Adjust(ScenarioInput::OrderValue(75_000.0))))
//!     .unwrap();
//!
//! assert_eq!(store.state(selectors::total_discount), 11);
//! ```

pub mod actions;
pub mod persistence;
pub mod reducer;
pub mod selectors;
pub mod slices;
pub mod storage;
pub mod types;

pub use actions::{
    AppAction, CalculationUpdate, CalculatorAction, CustomerAction, I18nAction, LocationsAction,
    PdfAction, ProfileAction, ScenarioInput, SettingsAction, UiAction,
};
pub use persistence::{PersistedAppState, SCHEMA_VERSION, STORAGE_KEY};
pub use reducer::{AppEnvironment, AppReducer};
pub use storage::FileStorage;
pub use types::*;

use offerdesk_core::environment::StateStorage;
use offerdesk_runtime::{Store, StoreConfig};
use std::sync::Arc;

/// The store holding the application state
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// Build a store hydrated from `storage` that persists after every action
///
/// The initial state uses the environment's deployment mode. `Hydrate` is not
/// sent here; callers that track `app.initialized` send it once they are
/// ready.
#[must_use]
pub fn open_store(
    environment: AppEnvironment,
    storage: Arc<dyn StateStorage>,
    config: &StoreConfig,
) -> AppStore {
    let defaults = AppState::new(environment.mode);
    Store::with_persistence(defaults, AppReducer::new(), environment, storage, config)
}

/// Build a store without persistence
#[must_use]
pub fn in_memory_store(environment: AppEnvironment) -> AppStore {
    let defaults = AppState::new(environment.mode);
    Store::new(defaults, AppReducer::new(), environment)
}
