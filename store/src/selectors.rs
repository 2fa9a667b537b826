//! Read-only views over the application state.

use crate::types::{AppState, CustomerData, CustomerType, Notification, Salesperson};
use offerdesk_pricing::PricingResult;

/// Last computed pricing breakdown
#[must_use]
pub fn calculation(state: &AppState) -> Option<&PricingResult> {
    state.calculator.calculation.as_ref()
}

/// Total discount in percentage points, 0 without a calculation
#[must_use]
pub fn total_discount(state: &AppState) -> u32 {
    calculation(state).map_or(0, |c| c.total_discount)
}

/// Final price, 0 without a calculation
#[must_use]
pub fn final_price(state: &AppState) -> f64 {
    calculation(state).map_or(0.0, |c| c.final_price)
}

/// Customer master data
#[must_use]
pub fn customer_data(state: &AppState) -> Option<&CustomerData> {
    state.customer.data.as_ref()
}

/// Valid and saved
#[must_use]
pub const fn is_customer_valid(state: &AppState) -> bool {
    state.customer.is_valid && !state.customer.is_dirty
}

/// Company name, empty without a record
#[must_use]
pub fn customer_name(state: &AppState) -> &str {
    customer_data(state).map_or("", |d| d.company_name.as_str())
}

/// Salesperson details
#[must_use]
pub const fn salesperson(state: &AppState) -> &Salesperson {
    &state.settings.salesperson
}

/// Default discount from the settings
#[must_use]
pub const fn default_discount(state: &AppState) -> u32 {
    state.settings.defaults.discount
}

/// Active tab
#[must_use]
pub fn current_tab(state: &AppState) -> &str {
    &state.ui.current_tab
}

/// Loading flag
#[must_use]
pub const fn is_loading(state: &AppState) -> bool {
    state.ui.loading
}

/// Visible notifications
#[must_use]
pub fn notifications(state: &AppState) -> &[Notification] {
    &state.ui.notifications
}

/// An error message is set
#[must_use]
pub const fn has_error(state: &AppState) -> bool {
    state.ui.error.is_some()
}

/// Values derived from the calculation and the customer record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedValues {
    /// A calculation exists with a non-zero discount
    pub has_discount: bool,
    /// The customer record is a chain
    pub is_chain_customer: bool,
    /// A customer record with a company name exists
    pub can_generate_offer: bool,
    /// Twelve months of the current discount amount
    pub savings_per_year: f64,
}

/// Derive [`ComputedValues`]
#[must_use]
pub fn computed_values(state: &AppState) -> ComputedValues {
    let calculation = calculation(state);
    let customer = customer_data(state);

    ComputedValues {
        has_discount: calculation.is_some_and(|c| c.total_discount > 0),
        is_chain_customer: customer.is_some_and(|d| d.customer_type == CustomerType::Chain),
        can_generate_offer: customer.is_some_and(|d| !d.company_name.is_empty()),
        savings_per_year: calculation.map_or(0.0, |c| c.discount_amount * 12.0),
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::CustomerState;
    use offerdesk_pricing::calculate;

    #[test]
    fn empty_state_views() {
        let state = AppState::default();

        assert_eq!(total_discount(&state), 0);
        assert_eq!(final_price(&state), 0.0);
        assert_eq!(customer_name(&state), "");
        assert!(is_customer_valid(&state));
        assert!(!has_error(&state));
        assert_eq!(current_tab(&state), "demonstrator");
        assert_eq!(default_discount(&state), 15);
        assert_eq!(
            computed_values(&state),
            ComputedValues {
                has_discount: false,
                is_chain_customer: false,
                can_generate_offer: false,
                savings_per_year: 0.0,
            }
        );
    }

    #[test]
    fn views_over_a_quoted_customer() {
        let mut state = AppState::default();
        state.calculator.calculation = Some(calculate(&state.calculator.scenario()));
        state.customer = CustomerState {
            data: Some(CustomerData {
                company_name: "Kantine Nord".to_string(),
                customer_type: CustomerType::Chain,
                ..CustomerData::default()
            }),
            is_dirty: true,
            ..CustomerState::default()
        };

        assert_eq!(total_discount(&state), 7);
        assert_eq!(final_price(&state), 13_950.0);
        assert_eq!(customer_name(&state), "Kantine Nord");
        assert!(!is_customer_valid(&state));

        let computed = computed_values(&state);
        assert!(computed.has_discount);
        assert!(computed.is_chain_customer);
        assert!(computed.can_generate_offer);
        assert_eq!(computed.savings_per_year, 12_600.0);
    }
}
