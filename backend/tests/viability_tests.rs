//! Viability testing tests
//!
//! Tests for germination tests including:
//! - Property 7: Viability percentage
//! - Test sowing for counted and weighed accessions

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    most_recent_viability, viability_percent, Accession, NewViabilityTest, ProcessingMethod,
    Quantity, TestType, Unit, WithdrawalPurpose,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn today() -> NaiveDate {
    now().date_naive()
}

fn counted(seeds: u32) -> Accession {
    Accession::new("SB-2024-00200", false, now())
        .set_processing_method(ProcessingMethod::Count, now())
        .unwrap()
        .record_initial_quantity(Quantity::seeds(seeds), now())
        .unwrap()
}

fn sow(seeds_sown: u32, start_date: NaiveDate, remaining: Option<Quantity>) -> NewViabilityTest {
    NewViabilityTest {
        test_type: TestType::Nursery,
        seeds_sown,
        start_date,
        remaining_quantity: remaining,
        substrate: Some("Sand".to_string()),
        treatment: None,
        notes: None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Example: sown 50, results 10 and 8
    #[test]
    fn test_viability_example() {
        let accession = counted(100)
            .create_viability_test(sow(50, today(), None), now())
            .unwrap();
        let key = accession.viability_tests[0].key;
        let accession = accession
            .record_test_result(key, today() + Duration::days(7), 10, now())
            .unwrap()
            .record_test_result(key, today() + Duration::days(14), 8, now())
            .unwrap();

        let test = accession.viability_test(key).unwrap();
        assert_eq!(test.total_germinated(), 18);
        assert_eq!(test.viability_percent(), Some(dec("36.0")));
    }

    #[test]
    fn test_viability_rounds_half_away_from_zero() {
        // 1 / 8 = 12.5%, 1 / 16 = 6.25% -> 6.3
        assert_eq!(viability_percent(1, 8), Some(dec("12.5")));
        assert_eq!(viability_percent(1, 16), Some(dec("6.3")));
        assert_eq!(viability_percent(0, 0), None);
    }

    #[test]
    fn test_results_keep_entry_order() {
        let accession = counted(100)
            .create_viability_test(sow(20, today(), None), now())
            .unwrap();
        let key = accession.viability_tests[0].key;
        let accession = accession
            .record_test_result(key, today() + Duration::days(14), 3, now())
            .unwrap()
            .record_test_result(key, today() + Duration::days(7), 2, now())
            .unwrap();

        let germinated: Vec<u32> = accession
            .viability_test(key)
            .unwrap()
            .test_results
            .iter()
            .map(|r| r.seeds_germinated)
            .collect();
        assert_eq!(germinated, vec![3, 2]);
    }

    #[test]
    fn test_weighed_test_deducts_entered_difference() {
        let accession = Accession::new("SB-2024-00201", false, now())
            .set_processing_method(ProcessingMethod::Weight, now())
            .unwrap()
            .record_initial_quantity(Quantity::new(dec("100"), Unit::Grams).unwrap(), now())
            .unwrap()
            .create_viability_test(
                sow(30, today(), Some(Quantity::new(dec("97.5"), Unit::Grams).unwrap())),
                now(),
            )
            .unwrap();

        let entry = &accession.withdrawals[0];
        assert_eq!(entry.purpose, WithdrawalPurpose::ViabilityTesting);
        assert_eq!(entry.withdrawn_quantity.value, dec("2.5"));
        assert_eq!(
            accession.remaining_quantity(today()).unwrap().unwrap().value,
            dec("97.5")
        );
    }

    #[test]
    fn test_sowing_more_than_available_rejected() {
        let result = counted(10).create_viability_test(sow(11, today(), None), now());
        assert!(result.is_err());
    }

    #[test]
    fn test_future_test_is_scheduled() {
        let accession = counted(100)
            .create_viability_test(sow(10, today() + Duration::days(3), None), now())
            .unwrap();
        assert!(accession.viability_tests[0].is_scheduled(today()));
        assert_eq!(accession.remaining_quantity(today()).unwrap(), Some(Quantity::seeds(100)));
        assert_eq!(accession.projected_quantity().unwrap(), Some(Quantity::seeds(90)));
    }

    #[test]
    fn test_most_recent_viability_skips_scheduled() {
        let accession = counted(100)
            .create_viability_test(sow(10, today() - Duration::days(10), None), now())
            .unwrap();
        let first = accession.viability_tests[0].key;
        let accession = accession
            .record_test_result(first, today(), 5, now())
            .unwrap()
            .create_viability_test(sow(10, today() + Duration::days(10), None), now())
            .unwrap();

        let summary = most_recent_viability(&accession.viability_tests, today()).unwrap();
        assert_eq!(summary.test_key, first);
        assert_eq!(summary.viability_percent, dec("50.0"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property 7: Viability percentage
        /// Always between 0 and 100 when germinated <= sown, with one decimal place
        #[test]
        fn prop_viability_bounded(
            sown in 1u32..10_000,
            ratio in 0u32..=100,
        ) {
            let germinated = u64::from(sown) * u64::from(ratio) / 100;
            let pct = viability_percent(germinated, sown).unwrap();
            prop_assert!(pct >= Decimal::ZERO);
            prop_assert!(pct <= Decimal::ONE_HUNDRED);
            prop_assert!(pct.scale() <= 1);
        }

        /// Property: Sowing a counted test removes exactly the seeds sown
        #[test]
        fn prop_counted_test_withdraws_sown(
            initial in 1u32..1000,
            sown in 1u32..1000,
        ) {
            let accession = counted(initial);
            match accession.create_viability_test(sow(sown, today(), None), now()) {
                Ok(next) => {
                    prop_assert!(sown <= initial);
                    prop_assert_eq!(
                        next.remaining_quantity(today()).unwrap(),
                        Some(Quantity::seeds(initial - sown))
                    );
                }
                Err(_) => prop_assert!(sown > initial),
            }
        }

        /// Property: Recorded germination never exceeds the seeds sown
        #[test]
        fn prop_germinated_capped(
            sown in 1u32..500,
            counts in prop::collection::vec(0u32..200, 1..8),
        ) {
            let mut accession = counted(1000)
                .create_viability_test(sow(sown, today(), None), now())
                .unwrap();
            let key = accession.viability_tests[0].key;
            for count in counts {
                if let Ok(next) = accession.record_test_result(key, today(), count, now()) {
                    accession = next;
                }
            }
            let test = accession.viability_test(key).unwrap();
            prop_assert!(test.total_germinated() <= u64::from(sown));
        }
    }
}
