//! Application reducer and its environment.
//!
//! [`AppReducer`] is the combination of one scoped reducer per slice plus
//! [`RootReducer`], which handles the actions that touch the whole tree.

use crate::actions::{
    AppAction, CalculatorAction, CustomerAction, I18nAction, LocationsAction, PdfAction,
    ProfileAction, SettingsAction, UiAction,
};
use crate::slices::{
    CalculatorReducer, CustomerReducer, I18nReducer, LocationsReducer, PdfReducer,
    ProfileReducer, SettingsReducer, UiReducer,
};
use crate::types::{
    AppState, CalculatorState, CustomerState, I18nState, LocationsState, PdfState, ProfileState,
    RuntimeMode, SettingsState, UiState,
};
use offerdesk_core::composition::{combine_reducers, scope_reducer, CombinedReducer};
use offerdesk_core::environment::Clock;
use offerdesk_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use offerdesk_pricing::PricingRules;
use std::sync::Arc;

/// Dependencies of the application reducer
#[derive(Clone)]
pub struct AppEnvironment {
    /// Clock for notification timestamps
    pub clock: Arc<dyn Clock>,
    /// Discount rules used when recomputing the calculation
    pub pricing: PricingRules,
    /// Deployment mode restored by [`AppAction::Reset`]
    pub mode: RuntimeMode,
}

impl AppEnvironment {
    /// Environment with the standard pricing rules in production mode
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            pricing: PricingRules::default(),
            mode: RuntimeMode::Production,
        }
    }

    /// Replace the pricing rules
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingRules) -> Self {
        self.pricing = pricing;
        self
    }

    /// Set the deployment mode
    #[must_use]
    pub const fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Handles [`AppAction::Reset`] and [`AppAction::Hydrate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RootReducer;

impl Reducer for RootReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Reset => {
                tracing::info!("Resetting application state");
                *state = AppState::new(env.mode);
            },
            AppAction::Hydrate => state.app.initialized = true,
            _ => {},
        }

        smallvec![Effect::None]
    }
}

macro_rules! slice {
    ($lens:ident, $extract:ident, $field:ident: $state:ty, $variant:ident($action:ty)) => {
        fn $lens(state: &mut AppState) -> &mut $state {
            &mut state.$field
        }

        fn $extract(action: AppAction) -> Option<$action> {
            match action {
                AppAction::$variant(action) => Some(action),
                _ => None,
            }
        }
    };
}

slice!(calculator, calculator_action, calculator: CalculatorState, Calculator(CalculatorAction));
slice!(customer, customer_action, customer: CustomerState, Customer(CustomerAction));
slice!(locations, locations_action, locations: LocationsState, Locations(LocationsAction));
slice!(settings, settings_action, settings: SettingsState, Settings(SettingsAction));
slice!(profile, profile_action, profile: ProfileState, Profile(ProfileAction));
slice!(pdf, pdf_action, pdf: PdfState, Pdf(PdfAction));
slice!(i18n, i18n_action, i18n: I18nState, I18n(I18nAction));
slice!(ui, ui_action, ui: UiState, Ui(UiAction));

/// The reducer of the whole application state
pub struct AppReducer {
    inner: CombinedReducer<AppState, AppAction, AppEnvironment>,
}

impl AppReducer {
    /// Combine the slice reducers and the root reducer
    #[must_use]
    pub fn new() -> Self {
        let inner = combine_reducers(vec![
            Box::new(scope_reducer(
                CalculatorReducer,
                calculator,
                calculator_action,
                AppAction::Calculator,
            )),
            Box::new(scope_reducer(
                CustomerReducer,
                customer,
                customer_action,
                AppAction::Customer,
            )),
            Box::new(scope_reducer(
                LocationsReducer,
                locations,
                locations_action,
                AppAction::Locations,
            )),
            Box::new(scope_reducer(
                SettingsReducer,
                settings,
                settings_action,
                AppAction::Settings,
            )),
            Box::new(scope_reducer(ProfileReducer, profile, profile_action, AppAction::Profile)),
            Box::new(scope_reducer(PdfReducer, pdf, pdf_action, AppAction::Pdf)),
            Box::new(scope_reducer(I18nReducer, i18n, i18n_action, AppAction::I18n)),
            Box::new(scope_reducer(UiReducer, ui, ui_action, AppAction::Ui)),
            Box::new(RootReducer),
        ]);
        Self { inner }
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        self.inner.reduce(state, action, env)
    }
}
