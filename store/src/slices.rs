//! Slice reducers.
//!
//! Each reducer owns exactly one slice and never reads another. They are
//! scoped into the application reducer by [`crate::reducer::AppReducer`].

use crate::actions::{
    CalculationUpdate, CalculatorAction, CustomerAction, I18nAction, LocationsAction, PdfAction,
    ProfileAction, ScenarioInput, SettingsAction, UiAction,
};
use crate::reducer::AppEnvironment;
use crate::types::{
    CalculatorState, CustomerData, CustomerState, I18nState, LocationsState, Notification,
    PdfState, ProfileState, SettingsState, UiState,
};
use offerdesk_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random part of a notification id
const NOTIFICATION_SUFFIX_LEN: usize = 9;

/// Calculator inputs and the derived pricing breakdown
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorReducer;

impl Reducer for CalculatorReducer {
    type State = CalculatorState;
    type Action = CalculatorAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CalculatorAction::SetOrderValue(value) => state.order_value = value,
            CalculatorAction::SetLeadTime(value) => state.lead_time = value,
            CalculatorAction::SetPickup(pickup) => state.pickup = pickup,
            CalculatorAction::SetChain(chain) => state.chain = chain,
            CalculatorAction::UpdateCalculation(CalculationUpdate::Recompute) => {
                let result = env.pricing.calculate(&state.scenario());
                tracing::debug!(
                    total_discount = result.total_discount,
                    final_price = result.final_price,
                    "Recomputed pricing"
                );
                state.calculation = Some(result);
            },
            CalculatorAction::UpdateCalculation(CalculationUpdate::Replace(calculation)) => {
                state.calculation = calculation;
            },
            CalculatorAction::Adjust(input) => {
                match input {
                    ScenarioInput::OrderValue(value) => state.order_value = value,
                    ScenarioInput::LeadTime(value) => state.lead_time = value,
                    ScenarioInput::Pickup(pickup) => state.pickup = pickup,
                    ScenarioInput::Chain(chain) => state.chain = chain,
                }
                return smallvec![Effect::send(CalculatorAction::UpdateCalculation(
                    CalculationUpdate::Recompute
                ))];
            },
        }

        smallvec![Effect::None]
    }
}

/// Customer record and flags
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerReducer;

impl Reducer for CustomerReducer {
    type State = CustomerState;
    type Action = CustomerAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CustomerAction::SetCustomerData(patch) => {
                patch.apply(state.data.get_or_insert_with(CustomerData::default));
                state.is_dirty = true;
            },
            CustomerAction::SetCustomerType(customer_type) => {
                state.customer_type = customer_type;
                if let Some(data) = &mut state.data {
                    data.customer_type = customer_type;
                }
            },
            CustomerAction::SetIndustry(industry) => {
                if let Some(data) = &mut state.data {
                    data.industry.clone_from(&industry);
                }
                state.industry = industry;
            },
            CustomerAction::Save => state.is_dirty = false,
            CustomerAction::Clear => *state = CustomerState::default(),
            CustomerAction::Update(patch) => {
                let industry = &state.industry;
                let customer_type = state.customer_type;
                let data = state.data.get_or_insert_with(|| CustomerData {
                    industry: industry.clone(),
                    customer_type,
                    ..CustomerData::default()
                });
                patch.apply(data);
                state.is_dirty = true;
            },
        }

        smallvec![Effect::None]
    }
}

/// Delivery locations
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationsReducer;

impl Reducer for LocationsReducer {
    type State = LocationsState;
    type Action = LocationsAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            LocationsAction::UpdateLocations(locations) => state.locations = locations,
            LocationsAction::SetTotalLocations(total) => state.total_locations = total,
            LocationsAction::SetCaptureDetails(capture) => state.capture_details = capture,
        }

        smallvec![Effect::None]
    }
}

/// Salesperson, defaults and integrations
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsReducer;

impl Reducer for SettingsReducer {
    type State = SettingsState;
    type Action = SettingsAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SettingsAction::Update(patch) => {
                if let Some(salesperson) = patch.salesperson {
                    state.salesperson = salesperson;
                }
                if let Some(defaults) = patch.defaults {
                    state.defaults = defaults;
                }
                if let Some(integrations) = patch.integrations {
                    state.integrations = integrations;
                }
            },
            SettingsAction::UpdateSalesperson(patch) => patch.apply(&mut state.salesperson),
            SettingsAction::UpdateIntegration(patch) => patch.apply(&mut state.integrations),
        }

        smallvec![Effect::None]
    }
}

/// Generated customer profile
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileReducer;

impl Reducer for ProfileReducer {
    type State = ProfileState;
    type Action = ProfileAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ProfileAction::SetProfileData(data) => state.data = data,
            // Generation happens outside the store; the request is only traced.
            ProfileAction::GenerateProfile => {
                tracing::info!("Generating profile from customer data");
            },
        }

        smallvec![Effect::None]
    }
}

/// Offer document
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReducer;

impl Reducer for PdfReducer {
    type State = PdfState;
    type Action = PdfAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            PdfAction::SetAvailable(available) => state.available = available,
            PdfAction::SetCurrent { document, filename } => {
                state.current_pdf = Some(document);
                state.filename = Some(filename);
            },
            PdfAction::Clear => {
                state.current_pdf = None;
                state.filename = None;
            },
        }

        smallvec![Effect::None]
    }
}

/// Interface language
#[derive(Debug, Clone, Copy, Default)]
pub struct I18nReducer;

impl Reducer for I18nReducer {
    type State = I18nState;
    type Action = I18nAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            I18nAction::SetLanguage(language) => state.current_language = language,
            I18nAction::ToggleAutoUpdate => state.auto_update = !state.auto_update,
        }

        smallvec![Effect::None]
    }
}

/// Tabs, loading flag, errors and notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct UiReducer;

impl Reducer for UiReducer {
    type State = UiState;
    type Action = UiAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            UiAction::SetCurrentTab(tab) => state.current_tab = tab,
            UiAction::SetLoading(loading) => state.loading = loading,
            UiAction::SetError(error) => state.error = error,
            UiAction::ClearError => state.error = None,
            UiAction::AddNotification(notification) => {
                let timestamp = env.clock.now().timestamp_millis();
                state.notifications.push(Notification {
                    id: notification_id(timestamp),
                    kind: notification.kind,
                    message: notification.message,
                    duration: notification.duration,
                    timestamp,
                });
            },
            UiAction::RemoveNotification(id) => state.notifications.retain(|n| n.id != id),
            UiAction::ClearNotifications => state.notifications.clear(),
            UiAction::PruneExpiredNotifications => {
                let now = env.clock.now().timestamp_millis();
                state.notifications.retain(|n| !n.is_expired(now));
            },
        }

        smallvec![Effect::None]
    }
}

fn notification_id(timestamp: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NOTIFICATION_SUFFIX_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("notif-{timestamp}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomerPatch, CustomerType, IntegrationPatch, NewNotification};
    use offerdesk_core::environment::Clock;
    use offerdesk_testing::{assertions, test_clock, ReducerTest};
    use std::sync::Arc;

    fn env() -> AppEnvironment {
        AppEnvironment::new(Arc::new(test_clock()))
    }

    #[test]
    fn setters_do_not_recompute() {
        ReducerTest::new(CalculatorReducer)
            .with_env(env())
            .given_state(CalculatorState::default())
            .when_action(CalculatorAction::SetOrderValue(50_000.0))
            .when_action(CalculatorAction::SetPickup(true))
            .then_state(|state| {
                assert!((state.order_value - 50_000.0).abs() < f64::EPSILON);
                assert!(state.pickup);
                assert!(state.calculation.is_none());
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn recompute_uses_current_inputs() {
        ReducerTest::new(CalculatorReducer)
            .with_env(env())
            .given_state(CalculatorState::default())
            .when_action(CalculatorAction::UpdateCalculation(CalculationUpdate::Recompute))
            .then_state(|state| {
                let calculation = state.calculation.as_ref().map(|c| c.total_discount);
                assert_eq!(calculation, Some(7));
            })
            .run();
    }

    #[test]
    fn replace_stores_given_breakdown() {
        ReducerTest::new(CalculatorReducer)
            .with_env(env())
            .given_state(CalculatorState::default())
            .when_action(CalculatorAction::UpdateCalculation(CalculationUpdate::Recompute))
            .when_action(CalculatorAction::UpdateCalculation(CalculationUpdate::Replace(None)))
            .then_state(|state| assert!(state.calculation.is_none()))
            .run();
    }

    #[test]
    fn adjust_sets_input_and_requests_recompute() {
        ReducerTest::new(CalculatorReducer)
            .with_env(env())
            .given_state(CalculatorState::default())
            .when_action(CalculatorAction::Adjust(ScenarioInput::LeadTime(30.0)))
            .then_state(|state| {
                assert!((state.lead_time - 30.0).abs() < f64::EPSILON);
                assert!(state.calculation.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_sends(
                    effects,
                    &[CalculatorAction::UpdateCalculation(CalculationUpdate::Recompute)],
                );
            })
            .run();
    }

    #[test]
    fn set_customer_data_creates_record_and_marks_dirty() {
        ReducerTest::new(CustomerReducer)
            .with_env(env())
            .given_state(CustomerState::default())
            .when_action(CustomerAction::SetCustomerData(CustomerPatch {
                company_name: Some("Kantine Nord".to_string()),
                ..CustomerPatch::default()
            }))
            .then_state(|state| {
                let data = state.data.as_ref().map(|d| d.company_name.as_str());
                assert_eq!(data, Some("Kantine Nord"));
                assert!(state.is_dirty);
            })
            .run();
    }

    #[test]
    fn type_and_industry_mirror_into_record() {
        ReducerTest::new(CustomerReducer)
            .with_env(env())
            .given_state(CustomerState::default())
            .when_action(CustomerAction::SetIndustry("hotel".to_string()))
            .when_action(CustomerAction::SetCustomerData(CustomerPatch::default()))
            .when_action(CustomerAction::SetCustomerType(CustomerType::Chain))
            .when_action(CustomerAction::SetIndustry("klinik".to_string()))
            .then_state(|state| {
                assert_eq!(state.industry, "klinik");
                assert_eq!(state.customer_type, CustomerType::Chain);
                let data = state.data.clone().unwrap_or_default();
                assert_eq!(data.industry, "klinik");
                assert_eq!(data.customer_type, CustomerType::Chain);
            })
            .run();
    }

    #[test]
    fn update_seeds_record_from_slice() {
        ReducerTest::new(CustomerReducer)
            .with_env(env())
            .given_state(CustomerState {
                industry: "hotel".to_string(),
                customer_type: CustomerType::Chain,
                ..CustomerState::default()
            })
            .when_action(CustomerAction::Update(CustomerPatch {
                city: Some("Hamburg".to_string()),
                ..CustomerPatch::default()
            }))
            .then_state(|state| {
                let data = state.data.clone().unwrap_or_default();
                assert_eq!(data.industry, "hotel");
                assert_eq!(data.customer_type, CustomerType::Chain);
                assert_eq!(data.city, "Hamburg");
                assert!(state.is_dirty);
            })
            .run();
    }

    #[test]
    fn save_and_clear() {
        ReducerTest::new(CustomerReducer)
            .with_env(env())
            .given_state(CustomerState::default())
            .when_action(CustomerAction::Update(CustomerPatch::default()))
            .when_action(CustomerAction::Save)
            .then_state(|state| {
                assert!(!state.is_dirty);
                assert!(state.data.is_some());
            })
            .run();

        ReducerTest::new(CustomerReducer)
            .with_env(env())
            .given_state(CustomerState {
                industry: "hotel".to_string(),
                is_dirty: true,
                ..CustomerState::default()
            })
            .when_action(CustomerAction::Clear)
            .then_state(|state| assert_eq!(*state, CustomerState::default()))
            .run();
    }

    #[test]
    fn integration_update_merges() {
        ReducerTest::new(SettingsReducer)
            .with_env(env())
            .given_state(SettingsState::default())
            .when_action(SettingsAction::UpdateIntegration(IntegrationPatch::Xentral {
                url: Some("https://erp.example".to_string()),
                key: None,
            }))
            .then_state(|state| {
                assert_eq!(state.integrations.xentral.url, "https://erp.example");
                assert_eq!(state.integrations.xentral.key, "");
            })
            .run();
    }

    #[test]
    fn toggle_auto_update() {
        ReducerTest::new(I18nReducer)
            .with_env(env())
            .given_state(I18nState::default())
            .when_action(I18nAction::ToggleAutoUpdate)
            .then_state(|state| assert!(!state.auto_update))
            .run();
    }

    #[test]
    fn pdf_set_and_clear() {
        ReducerTest::new(PdfReducer)
            .with_env(env())
            .given_state(PdfState::default())
            .when_action(PdfAction::SetCurrent {
                document: serde_json::json!({ "pages": 2 }),
                filename: "angebot.pdf".to_string(),
            })
            .when_action(PdfAction::Clear)
            .then_state(|state| {
                assert!(state.current_pdf.is_none());
                assert!(state.filename.is_none());
                assert!(state.available);
            })
            .run();
    }

    #[test]
    fn notifications_get_clock_timestamp_and_id() {
        let clock = test_clock();
        let env = AppEnvironment::new(Arc::new(clock.clone()));
        let mut state = UiState::default();

        let _ = UiReducer.reduce(
            &mut state,
            UiAction::AddNotification(NewNotification::success("Gespeichert")),
            &env,
        );

        let notification = &state.notifications[0];
        let millis = clock.now().timestamp_millis();
        assert_eq!(notification.timestamp, millis);
        assert!(notification.id.starts_with(&format!("notif-{millis}-")));
        assert_eq!(notification.id.len(), format!("notif-{millis}-").len() + 9);
        assert_eq!(notification.duration, Some(3_000));
    }

    #[test]
    fn prune_removes_only_expired_notifications() {
        let clock = test_clock();
        let env = AppEnvironment::new(Arc::new(clock.clone()));
        let mut state = UiState::default();

        let _ = UiReducer.reduce(
            &mut state,
            UiAction::AddNotification(NewNotification::info("kurz")),
            &env,
        );
        let _ = UiReducer.reduce(
            &mut state,
            UiAction::AddNotification(NewNotification::error("lang")),
            &env,
        );
        let _ = UiReducer.reduce(
            &mut state,
            UiAction::AddNotification(NewNotification::warning("bleibt").sticky()),
            &env,
        );

        clock.advance(chrono::Duration::milliseconds(3_500));
        let _ = UiReducer.reduce(&mut state, UiAction::PruneExpiredNotifications, &env);

        let messages: Vec<&str> = state.notifications.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["lang", "bleibt"]);
    }

    #[test]
    fn remove_notification_by_id() {
        let env = env();
        let mut state = UiState::default();
        let _ = UiReducer.reduce(
            &mut state,
            UiAction::AddNotification(NewNotification::info("a")),
            &env,
        );
        let id = state.notifications[0].id.clone();

        let _ = UiReducer.reduce(&mut state, UiAction::RemoveNotification(id), &env);
        assert!(state.notifications.is_empty());
    }
}
