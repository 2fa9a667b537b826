//! # Offerdesk Pricing
//!
//! Deterministic, side-effect-free discount calculation for an order
//! scenario.
//!
//! Three tier tables drive the result:
//!
//! | order value | base discount |   | lead time (days) | early-booking discount |
//! |------------:|--------------:|---|-----------------:|-----------------------:|
//! | ≥ 75 000    | 10 %          |   | ≥ 30             | 3 %                    |
//! | ≥ 50 000    | 9 %           |   | ≥ 15             | 2 %                    |
//! | ≥ 30 000    | 8 %           |   | ≥ 10             | 1 %                    |
//! | ≥ 15 000    | 6 %           |   | ≥ 0              | 0 %                    |
//! | ≥ 5 000     | 3 %           |   |                  |                        |
//! | ≥ 0         | 0 %           |   |                  |                        |
//!
//! Pickup adds 2 points for orders of at least 5 000, the chain flag adds
//! nothing, and the total is capped at 15 points.
//!
//! ## Example
//!
//! ```
//! use offerdesk_pricing::{calculate, Scenario};
//!
//! let result = calculate(&Scenario::new(15_000.0, 14.0, false, false));
//! assert_eq!(result.total_discount, 7);
//! assert_eq!(result.final_price, 13_950.0);
//! ```

mod tier;

pub use tier::{TierEntry, TierTable, BASE_DISCOUNT_TIERS, EARLY_BOOKING_TIERS};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised when building custom pricing rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// A tier table has no entries
    #[error("Tier table is empty")]
    EmptyTable,

    /// Thresholds do not strictly decrease
    #[error("Tier thresholds must strictly decrease (entry {index})")]
    NotDescending {
        /// Index of the offending entry
        index: usize,
    },

    /// The last entry is not the `{ threshold: 0, discount: 0 }` fallback
    #[error("Tier table must end with a zero threshold and zero discount")]
    MissingFallback,
}

/// Input to the pricing calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Order value in currency units
    pub order_value: f64,
    /// Days between booking and delivery
    pub lead_time: f64,
    /// Customer picks the goods up
    pub pickup: bool,
    /// Customer is a chain with several locations
    pub chain: bool,
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub const fn new(order_value: f64, lead_time: f64, pickup: bool, chain: bool) -> Self {
        Self {
            order_value,
            lead_time,
            pickup,
            chain,
        }
    }
}

/// Discount breakdown and final price for a scenario
///
/// Discounts are whole percentage points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    /// Order value the result was computed for
    #[serde(deserialize_with = "nan_if_null")]
    pub order_value: f64,
    /// Lead time the result was computed for
    #[serde(deserialize_with = "nan_if_null")]
    pub lead_time: f64,
    /// Pickup flag the result was computed for
    pub pickup: bool,
    /// Chain flag the result was computed for
    pub chain: bool,
    /// Volume discount
    pub base_discount: u32,
    /// Early-booking discount
    pub early_discount: u32,
    /// Pickup discount
    pub pickup_discount: u32,
    /// Chain discount (reserved, currently always 0)
    pub chain_discount: u32,
    /// Capped sum of all discounts
    pub total_discount: u32,
    /// `round(order_value * total_discount / 100)`
    #[serde(deserialize_with = "nan_if_null")]
    pub discount_amount: f64,
    /// `order_value - discount_amount`
    #[serde(deserialize_with = "nan_if_null")]
    pub final_price: f64,
    /// Same as `discount_amount`, kept for offer documents
    #[serde(deserialize_with = "nan_if_null")]
    pub savings_amount: f64,
}

/// JSON has no NaN or infinity; serde_json writes them as `null`
fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// The full rule set used by [`PricingRules::calculate`]
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRules {
    /// Volume discount keyed on order value
    pub base: TierTable,
    /// Early-booking discount keyed on lead time
    pub early_booking: TierTable,
    /// Flat pickup discount in percentage points
    pub pickup_discount: u32,
    /// Minimum order value for the pickup discount
    pub pickup_min_order: f64,
    /// Chain discount in percentage points
    pub chain_discount: u32,
    /// Upper bound of the summed discount
    pub max_total_discount: u32,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            base: BASE_DISCOUNT_TIERS.clone(),
            early_booking: EARLY_BOOKING_TIERS.clone(),
            pickup_discount: 2,
            pickup_min_order: 5_000.0,
            chain_discount: 0,
            max_total_discount: 15,
        }
    }
}

impl PricingRules {
    /// Compute the discount breakdown for `scenario`
    ///
    /// Never fails. Negative and non-finite inputs are not validated: they
    /// fall through to the zero tiers and flow into the price unchanged.
    #[must_use]
    pub fn calculate(&self, scenario: &Scenario) -> PricingResult {
        let base_discount = self.base.lookup(scenario.order_value);
        let early_discount = self.early_booking.lookup(scenario.lead_time);
        let pickup_discount = if scenario.pickup && scenario.order_value >= self.pickup_min_order {
            self.pickup_discount
        } else {
            0
        };
        let chain_discount = self.chain_discount;

        let total_discount = base_discount
            .saturating_add(early_discount)
            .saturating_add(pickup_discount)
            .saturating_add(chain_discount)
            .min(self.max_total_discount);
        let discount_amount =
            (scenario.order_value * f64::from(total_discount) / 100.0).round();
        let final_price = scenario.order_value - discount_amount;

        PricingResult {
            order_value: scenario.order_value,
            lead_time: scenario.lead_time,
            pickup: scenario.pickup,
            chain: scenario.chain,
            base_discount,
            early_discount,
            pickup_discount,
            chain_discount,
            total_discount,
            discount_amount,
            final_price,
            savings_amount: discount_amount,
        }
    }
}

/// Compute the discount breakdown for `scenario` with the standard rules
#[must_use]
pub fn calculate(scenario: &Scenario) -> PricingResult {
    PricingRules::default().calculate(scenario)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn scenario(order_value: f64, lead_time: f64, pickup: bool) -> Scenario {
        Scenario::new(order_value, lead_time, pickup, false)
    }

    #[test]
    fn default_scenario_breakdown() {
        let result = calculate(&scenario(15_000.0, 14.0, false));

        assert_eq!(result.base_discount, 6);
        assert_eq!(result.early_discount, 1);
        assert_eq!(result.pickup_discount, 0);
        assert_eq!(result.chain_discount, 0);
        assert_eq!(result.total_discount, 7);
        assert_eq!(result.discount_amount, 1_050.0);
        assert_eq!(result.final_price, 13_950.0);
        assert_eq!(result.savings_amount, 1_050.0);
    }

    #[test]
    fn maximum_scenario_lands_exactly_on_cap() {
        let result = calculate(&scenario(75_000.0, 30.0, true));

        assert_eq!(result.base_discount, 10);
        assert_eq!(result.early_discount, 3);
        assert_eq!(result.pickup_discount, 2);
        assert_eq!(result.total_discount, 15);
        assert_eq!(result.discount_amount, 11_250.0);
        assert_eq!(result.final_price, 63_750.0);
    }

    #[test]
    fn cap_applies_when_components_exceed_it() {
        let rules = PricingRules {
            base: TierTable::new(vec![
                TierEntry::new(1_000.0, 12),
                TierEntry::new(0.0, 0),
            ])
            .unwrap(),
            ..PricingRules::default()
        };

        let result = rules.calculate(&scenario(10_000.0, 30.0, true));

        assert_eq!(
            result.base_discount + result.early_discount + result.pickup_discount,
            17
        );
        assert_eq!(result.total_discount, 15);
        assert_eq!(result.discount_amount, 1_500.0);
        assert_eq!(result.final_price, 8_500.0);
    }

    #[test]
    fn lower_cap_is_respected() {
        let rules = PricingRules {
            max_total_discount: 5,
            ..PricingRules::default()
        };
        assert_eq!(rules.calculate(&scenario(15_000.0, 14.0, false)).total_discount, 5);
    }

    #[test]
    fn huge_components_saturate_before_the_cap() {
        let rules = PricingRules {
            base: TierTable::new(vec![TierEntry::new(1.0, u32::MAX), TierEntry::new(0.0, 0)])
                .unwrap(),
            pickup_discount: u32::MAX,
            chain_discount: 7,
            max_total_discount: 40,
            ..PricingRules::default()
        };

        let result = rules.calculate(&scenario(10_000.0, 30.0, true));

        assert_eq!(result.base_discount, u32::MAX);
        assert_eq!(result.total_discount, 40);
        assert_eq!(result.final_price, 6_000.0);
    }

    #[test]
    fn pickup_requires_minimum_order() {
        assert_eq!(calculate(&scenario(4_000.0, 0.0, true)).pickup_discount, 0);
        assert_eq!(calculate(&scenario(4_999.99, 0.0, true)).pickup_discount, 0);
        assert_eq!(calculate(&scenario(5_000.0, 0.0, true)).pickup_discount, 2);
        assert_eq!(calculate(&scenario(6_000.0, 0.0, false)).pickup_discount, 0);
    }

    #[test]
    fn chain_flag_has_no_price_effect() {
        let single = calculate(&Scenario::new(30_000.0, 20.0, true, false));
        let chain = calculate(&Scenario::new(30_000.0, 20.0, true, true));

        assert_eq!(chain.chain_discount, 0);
        assert!(chain.chain);
        assert_eq!(single.final_price, chain.final_price);
        assert_eq!(single.total_discount, chain.total_discount);
    }

    #[test]
    fn base_tier_boundaries() {
        let cases = [
            (0.0, 0),
            (3_000.0, 0),
            (4_999.0, 0),
            (5_000.0, 3),
            (12_000.0, 3),
            (15_000.0, 6),
            (25_000.0, 6),
            (30_000.0, 8),
            (45_000.0, 8),
            (50_000.0, 9),
            (70_000.0, 9),
            (75_000.0, 10),
            (100_000.0, 10),
        ];
        for (order_value, expected) in cases {
            assert_eq!(
                calculate(&scenario(order_value, 0.0, false)).base_discount,
                expected,
                "order value {order_value}"
            );
        }
    }

    #[test]
    fn early_booking_boundaries() {
        let cases = [
            (0.0, 0),
            (5.0, 0),
            (9.0, 0),
            (10.0, 1),
            (14.0, 1),
            (15.0, 2),
            (25.0, 2),
            (30.0, 3),
            (45.0, 3),
        ];
        for (lead_time, expected) in cases {
            assert_eq!(
                calculate(&scenario(10_000.0, lead_time, false)).early_discount,
                expected,
                "lead time {lead_time}"
            );
        }
    }

    #[test]
    fn discount_amount_is_rounded() {
        // 12_345 * 4 / 100 = 493.8
        let result = calculate(&scenario(12_345.0, 10.0, false));
        assert_eq!(result.total_discount, 4);
        assert_eq!(result.discount_amount, 494.0);
        assert_eq!(result.final_price, 11_851.0);
    }

    #[test]
    fn negative_inputs_pass_through() {
        let result = calculate(&scenario(-100.0, -3.0, true));
        assert_eq!(result.total_discount, 0);
        assert_eq!(result.discount_amount, 0.0);
        assert_eq!(result.final_price, -100.0);
    }

    #[test]
    fn nan_order_value_does_not_panic() {
        let result = calculate(&scenario(f64::NAN, 14.0, false));
        assert_eq!(result.base_discount, 0);
        assert_eq!(result.early_discount, 1);
        assert!(result.final_price.is_nan());
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(calculate(&scenario(15_000.0, 14.0, false))).unwrap();
        assert_eq!(json["totalDiscount"], 7);
        assert_eq!(json["finalPrice"], 13_950.0);
        assert!(json.get("savingsAmount").is_some());
    }

    #[test]
    fn non_finite_amounts_read_back_as_nan() {
        let result = calculate(&scenario(f64::INFINITY, 14.0, false));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""finalPrice":null"#));

        let restored: PricingResult = serde_json::from_str(&json).unwrap();
        assert!(restored.order_value.is_nan());
        assert!(restored.final_price.is_nan());
        assert_eq!(restored.lead_time, 14.0);
        assert_eq!(restored.total_discount, result.total_discount);
    }
}
