//! Persisted projection of the application state.
//!
//! Only `calculator`, `customer`, `settings`, `profile`, the language choice
//! and `locations` survive a restart. `app`, `pdf`, `ui` and the list of
//! available languages are session-only.

use crate::types::{
    AppState, CalculatorState, CustomerState, Language, LocationsState, ProfileState,
    SettingsState,
};
use offerdesk_core::persistence::Persist;
use serde::{Deserialize, Serialize};

/// Storage key of the persisted envelope
pub const STORAGE_KEY: &str = "offerdesk-store";

/// Schema version of [`PersistedAppState`]
pub const SCHEMA_VERSION: u32 = 1;

/// Persisted part of the language slice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedI18n {
    /// Selected language
    pub current_language: Language,
    /// Auto-update flag
    pub auto_update: bool,
}

impl Default for PersistedI18n {
    fn default() -> Self {
        Self {
            current_language: Language::De,
            auto_update: true,
        }
    }
}

/// The whitelisted slices written to storage
///
/// Every field defaults, so snapshots written by older or newer schema
/// versions still merge over the initial state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedAppState {
    /// Calculator slice
    pub calculator: CalculatorState,
    /// Customer slice
    pub customer: CustomerState,
    /// Settings slice
    pub settings: SettingsState,
    /// Profile slice
    pub profile: ProfileState,
    /// Language choice
    pub i18n: PersistedI18n,
    /// Locations slice
    pub locations: LocationsState,
}

impl Persist for AppState {
    type Snapshot = PersistedAppState;

    const KEY: &'static str = STORAGE_KEY;
    const VERSION: u32 = SCHEMA_VERSION;

    fn snapshot(&self) -> PersistedAppState {
        PersistedAppState {
            calculator: self.calculator.clone(),
            customer: self.customer.clone(),
            settings: self.settings.clone(),
            profile: self.profile.clone(),
            i18n: PersistedI18n {
                current_language: self.i18n.current_language,
                auto_update: self.i18n.auto_update,
            },
            locations: self.locations.clone(),
        }
    }

    fn restore(mut base: Self, snapshot: PersistedAppState) -> Self {
        base.calculator = snapshot.calculator;
        base.customer = snapshot.customer;
        base.settings = snapshot.settings;
        base.profile = snapshot.profile;
        base.i18n.current_language = snapshot.i18n.current_language;
        base.i18n.auto_update = snapshot.i18n.auto_update;
        base.locations = snapshot.locations;
        base
    }
}
