//! Quantity and processing estimate tests
//!
//! Tests for seed quantity accounting including:
//! - Property 1: Unit-family safety
//! - Property 4: Estimator totality
//! - Property 5: Subset estimate example

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    estimate_seed_count, DomainError, ProcessingMethod, ProcessingRecord, Quantity, Unit,
    UnitFamily, UNIT_TABLE,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn qty(value: &str, unit: Unit) -> Quantity {
    Quantity::new(dec(value), unit).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Every unit has a label and exactly one count unit exists
    #[test]
    fn test_unit_table() {
        assert_eq!(UNIT_TABLE.len(), 6);
        let count_units = UNIT_TABLE
            .iter()
            .filter(|info| info.unit.family() == UnitFamily::Count)
            .count();
        assert_eq!(count_units, 1);
        for info in UNIT_TABLE.iter() {
            assert!(!info.label.is_empty());
            assert_eq!(info.unit.label(), info.label);
        }
    }

    #[test]
    fn test_kilograms_to_grams() {
        let converted = qty("1.5", Unit::Kilograms).convert(Unit::Grams).unwrap();
        assert_eq!(converted.value, dec("1500"));
        assert_eq!(converted.unit, Unit::Grams);
    }

    #[test]
    fn test_pounds_to_ounces() {
        let converted = qty("1", Unit::Pounds).convert(Unit::Ounces).unwrap();
        assert_eq!(converted.value, dec("16"));
    }

    #[test]
    fn test_seeds_to_grams_fails() {
        let result = Quantity::seeds(10).convert(Unit::Grams);
        assert_eq!(
            result,
            Err(DomainError::UnitFamilyMismatch {
                from: Unit::Seeds,
                to: Unit::Grams
            })
        );
    }

    #[test]
    fn test_negative_quantity_rejected() {
        assert!(Quantity::new(dec("-1"), Unit::Grams).is_err());
    }

    /// 500 g total, 10 g subset holding 42 seeds
    #[test]
    fn test_subset_estimate_example() {
        let record = ProcessingRecord::new(ProcessingMethod::Weight)
            .with_initial_quantity(qty("500", Unit::Grams))
            .unwrap()
            .with_subset(Some(qty("10", Unit::Grams)), Some(42))
            .unwrap();
        assert_eq!(record.estimate(), Some(dec("2100")));
    }

    /// Subset weighed in a different unit than the total
    #[test]
    fn test_subset_estimate_mixed_units() {
        let record = ProcessingRecord::new(ProcessingMethod::Weight)
            .with_initial_quantity(qty("0.5", Unit::Kilograms))
            .unwrap()
            .with_subset(Some(qty("10", Unit::Grams)), Some(42))
            .unwrap();
        assert_eq!(record.estimate(), Some(dec("2100")));
    }

    #[test]
    fn test_estimate_without_subset_is_absent() {
        let record = ProcessingRecord::new(ProcessingMethod::Weight)
            .with_initial_quantity(qty("500", Unit::Grams))
            .unwrap();
        assert_eq!(record.estimate(), None);
    }

    #[test]
    fn test_count_record_rejects_weight() {
        let record = ProcessingRecord::new(ProcessingMethod::Count);
        assert!(record.with_initial_quantity(qty("5", Unit::Grams)).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating weight units
    fn weight_unit_strategy() -> impl Strategy<Value = Unit> {
        prop_oneof![
            Just(Unit::Grams),
            Just(Unit::Milligrams),
            Just(Unit::Kilograms),
            Just(Unit::Ounces),
            Just(Unit::Pounds),
        ]
    }

    /// Strategy for generating weights (0.01 to 10000.00)
    fn weight_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property 1: Unit-family safety
        /// Count and weight never convert into each other
        #[test]
        fn prop_cross_family_conversion_fails(
            unit in weight_unit_strategy(),
            seeds in 0u32..100_000,
        ) {
            let converted = Quantity::seeds(seeds).convert(unit);
            let is_mismatch = matches!(converted, Err(DomainError::UnitFamilyMismatch { .. }));
            prop_assert!(is_mismatch);

            let back = Quantity::zero(unit).convert(Unit::Seeds);
            let is_mismatch = matches!(back, Err(DomainError::UnitFamilyMismatch { .. }));
            prop_assert!(is_mismatch);
        }

        /// Property: Converting within a family keeps the family
        #[test]
        fn prop_same_family_conversion_succeeds(
            from in weight_unit_strategy(),
            to in weight_unit_strategy(),
            value in weight_strategy(),
        ) {
            let converted = Quantity::new(value, from).unwrap().convert(to).unwrap();
            prop_assert_eq!(converted.unit, to);
            prop_assert!(converted.value >= Decimal::ZERO);
        }

        /// Property: Subtracting never yields a negative quantity
        #[test]
        fn prop_subtract_non_negative(
            a in weight_strategy(),
            b in weight_strategy(),
        ) {
            let left = Quantity::new(a, Unit::Grams).unwrap();
            let right = Quantity::new(b, Unit::Grams).unwrap();
            match left.subtract(&right) {
                Ok(result) => {
                    prop_assert!(a >= b);
                    prop_assert_eq!(result.value, a - b);
                }
                Err(e) => {
                    prop_assert!(a < b);
                    let is_negative = matches!(e, DomainError::NegativeQuantity { .. });
                    prop_assert!(is_negative);
                }
            }
        }

        /// Property 4: Estimator totality
        /// Any input yields a value or an explicit absence, never a panic
        #[test]
        fn prop_estimator_total(
            count in any::<u32>(),
            total in any::<i64>(),
            subset in any::<i64>(),
            scale in 0u32..10,
        ) {
            let total = Decimal::new(total, scale);
            let subset = Decimal::new(subset, scale);
            let estimate = estimate_seed_count(count, total, subset);
            if subset <= Decimal::ZERO {
                prop_assert!(estimate.is_none());
            }
        }

        /// Property: The estimate scales with the total weight
        #[test]
        fn prop_estimate_proportional(
            count in 1u32..1000,
            subset in weight_strategy(),
            factor in 1i64..100,
        ) {
            let total = subset * Decimal::from(factor);
            let estimate = estimate_seed_count(count, total, subset).unwrap();
            prop_assert_eq!(estimate, Decimal::from(count) * Decimal::from(factor));
        }
    }
}
