//! Table from recognised dotted paths to store actions.
//!
//! Calculator paths always recompute the pricing breakdown, matching the
//! synchronous recalculation legacy callers rely on.

use crate::path::segments;
use crate::LegacyError;
use offerdesk_store::{
    AppAction, AppState, CalculationUpdate, CalculatorAction, CustomerAction, CustomerPatch,
    I18nAction, I18nState, OfferDefaults, ScenarioInput, SettingsAction, SettingsPatch,
    SettingsState, UiAction,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const CUSTOMER_FIELDS: &[&str] = &[
    "companyName",
    "contactName",
    "contactEmail",
    "contactPhone",
    "street",
    "postalCode",
    "city",
    "industry",
    "customerType",
];

const SALESPERSON_FIELDS: &[&str] = &["name", "email", "phone", "mobile"];

const INTEGRATION_FIELDS: &[(&str, &[&str])] = &[
    ("monday", &["token", "boardId"]),
    ("email", &["smtpServer", "smtpEmail", "smtpPassword"]),
    ("xentral", &["url", "key"]),
];

type Routed = Result<Option<Vec<AppAction>>, LegacyError>;

/// Actions that apply `value` at `path`, or `None` for an unknown path
///
/// # Errors
///
/// Returns [`LegacyError::InvalidValue`] when the path is recognised but the
/// value does not have the expected shape.
pub fn route(path: &str, value: &Value, state: &AppState) -> Routed {
    match segments(path).as_slice() {
        ["calculator", field] => calculator(path, field, value),
        ["customer", rest @ ..] => customer(path, rest, value),
        ["settings", rest @ ..] => settings(path, rest, value, &state.settings),
        ["ui", field] => ui(path, field, value),
        ["i18n", field] => i18n(path, field, value, &state.i18n),
        _ => Ok(None),
    }
}

/// Whether `route` knows `path`, regardless of the value
#[must_use]
pub fn is_recognised(path: &str) -> bool {
    match segments(path).as_slice() {
        ["calculator", field] => {
            matches!(*field, "orderValue" | "leadTime" | "pickup" | "chain" | "calculation")
        },
        ["customer", "data" | "customerType" | "industry"]
        | ["settings", "salesperson"]
        | ["settings", "defaults", "discount" | "contractDuration"]
        | ["ui", "currentTab" | "loading" | "error"]
        | ["i18n", "currentLanguage" | "autoUpdate"] => true,
        ["customer", "data", field] => CUSTOMER_FIELDS.contains(field),
        ["settings", "salesperson", field] => SALESPERSON_FIELDS.contains(field),
        ["settings", "integrations", name, field] => integration_field_known(name, field),
        _ => false,
    }
}

fn parse<T: DeserializeOwned>(path: &str, value: &Value) -> Result<T, LegacyError> {
    serde_json::from_value(value.clone()).map_err(|e| LegacyError::invalid(path, e))
}

/// Parse `{ field: value }` into a patch type
fn parse_field<T: DeserializeOwned>(
    path: &str,
    field: &str,
    value: &Value,
) -> Result<T, LegacyError> {
    let mut object = Map::new();
    object.insert(field.to_string(), value.clone());
    parse(path, &Value::Object(object))
}

/// `null` stands for an empty patch
fn parse_patch<T: DeserializeOwned + Default>(path: &str, value: &Value) -> Result<T, LegacyError> {
    if value.is_null() {
        Ok(T::default())
    } else {
        parse(path, value)
    }
}

fn one(action: impl Into<AppAction>) -> Routed {
    Ok(Some(vec![action.into()]))
}

fn calculator(path: &str, field: &str, value: &Value) -> Routed {
    let input = match field {
        "orderValue" => ScenarioInput::OrderValue(parse(path, value)?),
        "leadTime" => ScenarioInput::LeadTime(parse(path, value)?),
        "pickup" => ScenarioInput::Pickup(parse(path, value)?),
        "chain" => ScenarioInput::Chain(parse(path, value)?),
        "calculation" => {
            let calculation = parse(path, value)?;
            return one(CalculatorAction::UpdateCalculation(CalculationUpdate::Replace(
                calculation,
            )));
        },
        _ => return Ok(None),
    };
    one(CalculatorAction::Adjust(input))
}

fn customer(path: &str, rest: &[&str], value: &Value) -> Routed {
    match rest {
        ["data"] => one(CustomerAction::SetCustomerData(parse_patch(path, value)?)),
        ["data", field] if CUSTOMER_FIELDS.contains(field) => {
            let patch: CustomerPatch = parse_field(path, field, value)?;
            one(CustomerAction::SetCustomerData(patch))
        },
        ["customerType"] => one(CustomerAction::SetCustomerType(parse(path, value)?)),
        ["industry"] => one(CustomerAction::SetIndustry(parse(path, value)?)),
        _ => Ok(None),
    }
}

fn settings(path: &str, rest: &[&str], value: &Value, current: &SettingsState) -> Routed {
    match rest {
        ["salesperson"] => one(SettingsAction::UpdateSalesperson(parse_patch(path, value)?)),
        ["salesperson", field] if SALESPERSON_FIELDS.contains(field) => {
            one(SettingsAction::UpdateSalesperson(parse_field(path, field, value)?))
        },
        ["defaults", field @ ("discount" | "contractDuration")] => {
            let amount: u32 = parse(path, value)?;
            let defaults = if *field == "discount" {
                OfferDefaults {
                    discount: amount,
                    ..current.defaults.clone()
                }
            } else {
                OfferDefaults {
                    contract_duration: amount,
                    ..current.defaults.clone()
                }
            };
            one(SettingsAction::Update(SettingsPatch {
                defaults: Some(defaults),
                ..SettingsPatch::default()
            }))
        },
        ["integrations", name, field] if integration_field_known(name, field) => {
            let mut object = Map::new();
            object.insert("integration".to_string(), Value::String((*name).to_string()));
            object.insert((*field).to_string(), value.clone());
            one(SettingsAction::UpdateIntegration(parse(path, &Value::Object(object))?))
        },
        _ => Ok(None),
    }
}

fn integration_field_known(name: &str, field: &str) -> bool {
    INTEGRATION_FIELDS
        .iter()
        .any(|(integration, fields)| *integration == name && fields.contains(&field))
}

fn ui(path: &str, field: &str, value: &Value) -> Routed {
    match field {
        "currentTab" => one(UiAction::SetCurrentTab(parse(path, value)?)),
        "loading" => one(UiAction::SetLoading(parse(path, value)?)),
        "error" => one(UiAction::SetError(parse(path, value)?)),
        _ => Ok(None),
    }
}

fn i18n(path: &str, field: &str, value: &Value, current: &I18nState) -> Routed {
    match field {
        "currentLanguage" => one(I18nAction::SetLanguage(parse(path, value)?)),
        "autoUpdate" => {
            let enabled: bool = parse(path, value)?;
            if enabled == current.auto_update {
                Ok(Some(Vec::new()))
            } else {
                one(I18nAction::ToggleAutoUpdate)
            }
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use offerdesk_store::{CustomerType, IntegrationPatch, Language};
    use serde_json::json;

    fn routed(path: &str, value: Value) -> Option<Vec<AppAction>> {
        route(path, &value, &AppState::default()).unwrap()
    }

    #[test]
    fn calculator_paths_adjust_and_recompute() {
        assert_eq!(
            routed("calculator.orderValue", json!(20_000)),
            Some(vec![AppAction::Calculator(CalculatorAction::Adjust(
                ScenarioInput::OrderValue(20_000.0)
            ))])
        );
        assert_eq!(
            routed("calculator.calculation", Value::Null),
            Some(vec![AppAction::Calculator(CalculatorAction::UpdateCalculation(
                CalculationUpdate::Replace(None)
            ))])
        );
    }

    #[test]
    fn customer_field_becomes_patch() {
        assert_eq!(
            routed("customer.data.customerType", json!("chain")),
            Some(vec![AppAction::Customer(CustomerAction::SetCustomerData(
                CustomerPatch {
                    customer_type: Some(CustomerType::Chain),
                    ..CustomerPatch::default()
                }
            ))])
        );
    }

    #[test]
    fn defaults_keep_the_other_field() {
        let mut state = AppState::default();
        state.settings.defaults.contract_duration = 36;

        let actions = route("settings.defaults.discount", &json!(10), &state)
            .unwrap()
            .unwrap();
        assert_eq!(
            actions,
            vec![AppAction::Settings(SettingsAction::Update(SettingsPatch {
                defaults: Some(OfferDefaults {
                    discount: 10,
                    contract_duration: 36,
                }),
                ..SettingsPatch::default()
            }))]
        );
    }

    #[test]
    fn integration_fields() {
        assert_eq!(
            routed("settings.integrations.monday.boardId", json!("42")),
            Some(vec![AppAction::Settings(SettingsAction::UpdateIntegration(
                IntegrationPatch::Monday {
                    token: None,
                    board_id: Some("42".to_string()),
                }
            ))])
        );
        assert_eq!(routed("settings.integrations.monday.url", json!("x")), None);
    }

    #[test]
    fn auto_update_only_toggles_on_change() {
        assert_eq!(routed("i18n.autoUpdate", json!(true)), Some(Vec::new()));
        assert_eq!(
            routed("i18n.autoUpdate", json!(false)),
            Some(vec![AppAction::I18n(I18nAction::ToggleAutoUpdate)])
        );
        assert_eq!(
            routed("i18n.currentLanguage", json!("en")),
            Some(vec![AppAction::I18n(I18nAction::SetLanguage(Language::En))])
        );
    }

    #[test]
    fn unknown_paths_route_nowhere() {
        let paths = [
            "foo.bar",
            "calculator",
            "calculator.total",
            "ui.notifications",
            "pdf.filename",
        ];
        for path in paths {
            assert_eq!(routed(path, json!(1)), None, "{path}");
            assert!(!is_recognised(path), "{path}");
        }
    }

    #[test]
    fn wrong_types_are_rejected() {
        let error = route("calculator.pickup", &json!("yes"), &AppState::default()).unwrap_err();
        assert!(matches!(
            error,
            LegacyError::InvalidValue { ref path, .. } if path == "calculator.pickup"
        ));

        assert!(route("ui.loading", &json!(1), &AppState::default()).is_err());
        assert!(route("customer.customerType", &json!("franchise"), &AppState::default()).is_err());
    }

    #[test]
    fn recognised_paths_agree_with_route() {
        let cases = [
            ("calculator.leadTime", json!(10)),
            ("customer.data", json!({ "city": "Köln" })),
            ("customer.industry", json!("hotel")),
            ("settings.salesperson", json!({ "name": "Eva" })),
            ("settings.salesperson.mobile", json!("0170")),
            ("settings.defaults.contractDuration", json!(12)),
            ("settings.integrations.xentral.key", json!("k")),
            ("ui.currentTab", json!("customer")),
            ("ui.error", Value::Null),
        ];
        for (path, value) in cases {
            assert!(is_recognised(path), "{path}");
            assert!(routed(path, value).is_some(), "{path}");
        }
    }
}
