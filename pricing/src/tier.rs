//! Threshold tables mapping a value to a discount

use crate::PricingError;
use std::borrow::Cow;
use std::cmp::Ordering;

/// One row of a tier table: values `>= threshold` earn `discount` points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierEntry {
    /// Inclusive lower bound
    pub threshold: f64,
    /// Discount in whole percentage points
    pub discount: u32,
}

impl TierEntry {
    /// Create a tier row
    #[must_use]
    pub const fn new(threshold: f64, discount: u32) -> Self {
        Self {
            threshold,
            discount,
        }
    }
}

/// Tiers ordered by strictly descending threshold, ending in `{0, 0}`
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    entries: Cow<'static, [TierEntry]>,
}

/// Volume discount keyed on order value
pub const BASE_DISCOUNT_TIERS: TierTable = TierTable {
    entries: Cow::Borrowed(&[
        TierEntry::new(75_000.0, 10),
        TierEntry::new(50_000.0, 9),
        TierEntry::new(30_000.0, 8),
        TierEntry::new(15_000.0, 6),
        TierEntry::new(5_000.0, 3),
        TierEntry::new(0.0, 0),
    ]),
};

/// Early-booking discount keyed on lead time in days
pub const EARLY_BOOKING_TIERS: TierTable = TierTable {
    entries: Cow::Borrowed(&[
        TierEntry::new(30.0, 3),
        TierEntry::new(15.0, 2),
        TierEntry::new(10.0, 1),
        TierEntry::new(0.0, 0),
    ]),
};

impl TierTable {
    /// Build a custom table
    ///
    /// # Errors
    ///
    /// Returns [`PricingError`] if the table is empty, its thresholds do not
    /// strictly decrease, or it does not end with the `{0, 0}` fallback row.
    pub fn new(entries: Vec<TierEntry>) -> Result<Self, PricingError> {
        let last = entries.last().ok_or(PricingError::EmptyTable)?;
        if *last != TierEntry::new(0.0, 0) {
            return Err(PricingError::MissingFallback);
        }
        for (index, pair) in entries.windows(2).enumerate() {
            if pair[0].threshold.partial_cmp(&pair[1].threshold) != Some(Ordering::Greater) {
                return Err(PricingError::NotDescending { index: index + 1 });
            }
        }
        Ok(Self {
            entries: Cow::Owned(entries),
        })
    }

    /// Discount of the first row whose threshold is `<= value`
    ///
    /// Values below every threshold, and NaN, get 0.
    #[must_use]
    pub fn lookup(&self, value: f64) -> u32 {
        self.entries
            .iter()
            .find(|entry| value >= entry.threshold)
            .map_or(0, |entry| entry.discount)
    }

    /// Rows of the table
    #[must_use]
    pub fn entries(&self) -> &[TierEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_tables_are_valid() {
        assert!(TierTable::new(BASE_DISCOUNT_TIERS.entries().to_vec()).is_ok());
        assert!(TierTable::new(EARLY_BOOKING_TIERS.entries().to_vec()).is_ok());
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(TierTable::new(vec![]), Err(PricingError::EmptyTable));
    }

    #[test]
    fn rejects_missing_fallback() {
        let result = TierTable::new(vec![TierEntry::new(10.0, 1), TierEntry::new(5.0, 0)]);
        assert_eq!(result, Err(PricingError::MissingFallback));
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let result = TierTable::new(vec![
            TierEntry::new(10.0, 1),
            TierEntry::new(20.0, 2),
            TierEntry::new(0.0, 0),
        ]);
        assert_eq!(result, Err(PricingError::NotDescending { index: 1 }));
    }

    #[test]
    fn lookup_below_all_thresholds_is_zero() {
        assert_eq!(BASE_DISCOUNT_TIERS.lookup(-1.0), 0);
        assert_eq!(BASE_DISCOUNT_TIERS.lookup(f64::NAN), 0);
        assert_eq!(BASE_DISCOUNT_TIERS.lookup(f64::INFINITY), 10);
    }
}
