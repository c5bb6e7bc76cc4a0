//! Viability (germination) test models

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::quantity::Quantity;
use crate::types::RecordKey;

/// Where the germination trial is run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Lab,
    Nursery,
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestType::Lab => write!(f, "Lab"),
            TestType::Nursery => write!(f, "Nursery"),
        }
    }
}

/// A germination headcount recorded on a given date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResult {
    pub key: RecordKey,
    pub recording_date: NaiveDate,
    pub seeds_germinated: u32,
}

/// A germination trial sown from an accession's stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViabilityTest {
    pub key: RecordKey,
    pub test_type: TestType,
    pub seeds_sown: u32,
    pub start_date: NaiveDate,
    /// Stock left available for testing after this test was sown
    pub remaining_quantity: Quantity,
    pub substrate: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    /// Kept in entry order; sorting is left to the caller
    pub test_results: Vec<TestResult>,
}

/// Input for sowing a new test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewViabilityTest {
    pub test_type: TestType,
    pub seeds_sown: u32,
    pub start_date: NaiveDate,
    /// Required for weight-based accessions, ignored for counted ones
    pub remaining_quantity: Option<Quantity>,
    pub substrate: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
}

/// Editable descriptive fields of an existing test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDetails {
    pub test_type: TestType,
    pub substrate: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
}

impl ViabilityTest {
    /// Append a result; entries are not reordered by date
    pub fn add_result(&self, result: TestResult) -> ViabilityTest {
        let mut next = self.clone();
        next.test_results.push(result);
        next
    }

    /// Remove the result with the given key; the test itself always survives
    pub fn remove_result(&self, key: RecordKey) -> DomainResult<ViabilityTest> {
        let index = self.result_index(key)?;
        let mut next = self.clone();
        next.test_results.remove(index);
        Ok(next)
    }

    pub fn update_result(
        &self,
        key: RecordKey,
        recording_date: NaiveDate,
        seeds_germinated: u32,
    ) -> DomainResult<ViabilityTest> {
        let index = self.result_index(key)?;
        let mut next = self.clone();
        next.test_results[index] = TestResult {
            key,
            recording_date,
            seeds_germinated,
        };
        Ok(next)
    }

    pub fn with_details(&self, details: TestDetails) -> ViabilityTest {
        ViabilityTest {
            test_type: details.test_type,
            substrate: details.substrate,
            treatment: details.treatment,
            notes: details.notes,
            ..self.clone()
        }
    }

    pub fn result(&self, key: RecordKey) -> Option<&TestResult> {
        self.test_results.iter().find(|r| r.key == key)
    }

    pub fn total_germinated(&self) -> u64 {
        self.test_results
            .iter()
            .map(|r| u64::from(r.seeds_germinated))
            .sum()
    }

    pub fn viability_percent(&self) -> Option<Decimal> {
        compute_viability(self)
    }

    /// A test that starts after today has not been sown yet
    pub fn is_scheduled(&self, today: NaiveDate) -> bool {
        self.start_date > today
    }

    fn result_index(&self, key: RecordKey) -> DomainResult<usize> {
        self.test_results
            .iter()
            .position(|r| r.key == key)
            .ok_or(DomainError::RecordNotFound {
                kind: "Test result",
                key,
            })
    }
}

/// Germinated share of sown seeds, in percent to one decimal place
pub fn compute_viability(test: &ViabilityTest) -> Option<Decimal> {
    viability_percent(test.total_germinated(), test.seeds_sown)
}

/// total_germinated / seeds_sown * 100, rounded half away from zero to 0.1
pub fn viability_percent(total_germinated: u64, seeds_sown: u32) -> Option<Decimal> {
    if seeds_sown == 0 {
        return None;
    }
    let percent = Decimal::from(total_germinated) * Decimal::ONE_HUNDRED / Decimal::from(seeds_sown);
    Some(percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Latest viability figure shown on the accession summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViabilitySummary {
    pub test_key: RecordKey,
    pub test_type: TestType,
    pub start_date: NaiveDate,
    pub viability_percent: Decimal,
}

/// Most recent active test that has a computable viability
pub fn most_recent_viability(tests: &[ViabilityTest], today: NaiveDate) -> Option<ViabilitySummary> {
    tests
        .iter()
        .filter(|t| !t.is_scheduled(today))
        .filter_map(|t| t.viability_percent().map(|pct| (t, pct)))
        .max_by_key(|(t, _)| (t.start_date, t.key))
        .map(|(t, pct)| ViabilitySummary {
            test_key: t.key,
            test_type: t.test_type,
            start_date: t.start_date,
            viability_percent: pct,
        })
}

/// Seeds committed to tests that have not started yet
pub fn seeds_scheduled_for_testing(tests: &[ViabilityTest], today: NaiveDate) -> u64 {
    tests
        .iter()
        .filter(|t| t.is_scheduled(today))
        .map(|t| u64::from(t.seeds_sown))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn test_with(sown: u32, counts: &[u32], start: &str) -> ViabilityTest {
        let mut test = ViabilityTest {
            key: RecordKey(1),
            test_type: TestType::Lab,
            seeds_sown: sown,
            start_date: date(start),
            remaining_quantity: Quantity::seeds(100),
            substrate: None,
            treatment: None,
            notes: None,
            test_results: Vec::new(),
        };
        for (i, count) in counts.iter().enumerate() {
            test = test.add_result(TestResult {
                key: RecordKey(10 + i as u64),
                recording_date: date("2024-03-01"),
                seeds_germinated: *count,
            });
        }
        test
    }

    #[test]
    fn test_viability_example() {
        let test = test_with(50, &[10, 8], "2024-02-01");
        assert_eq!(test.total_germinated(), 18);
        assert_eq!(test.viability_percent(), Some(Decimal::from(36)));
    }

    #[test]
    fn test_viability_rounds_to_one_decimal() {
        let test = test_with(3, &[1], "2024-02-01");
        assert_eq!(test.viability_percent(), Decimal::from_str("33.3").ok());
        let test = test_with(3, &[2], "2024-02-01");
        assert_eq!(test.viability_percent(), Decimal::from_str("66.7").ok());
    }

    #[test]
    fn test_viability_undefined_without_sown_seeds() {
        assert_eq!(test_with(0, &[1], "2024-02-01").viability_percent(), None);
    }

    #[test]
    fn test_results_keep_entry_order() {
        let test = test_with(20, &[], "2024-02-01")
            .add_result(TestResult {
                key: RecordKey(2),
                recording_date: date("2024-03-10"),
                seeds_germinated: 4,
            })
            .add_result(TestResult {
                key: RecordKey(3),
                recording_date: date("2024-03-01"),
                seeds_germinated: 2,
            });
        let dates: Vec<_> = test.test_results.iter().map(|r| r.recording_date).collect();
        assert_eq!(dates, vec![date("2024-03-10"), date("2024-03-01")]);
    }

    #[test]
    fn test_remove_last_result_keeps_test() {
        let test = test_with(50, &[10], "2024-02-01");
        let emptied = test.remove_result(RecordKey(10)).unwrap();
        assert!(emptied.test_results.is_empty());
        assert_eq!(emptied.key, test.key);
        assert_eq!(emptied.viability_percent(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_remove_unknown_result() {
        let test = test_with(50, &[10], "2024-02-01");
        assert!(matches!(
            test.remove_result(RecordKey(99)),
            Err(DomainError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn test_update_result_by_key() {
        let test = test_with(50, &[10, 8], "2024-02-01");
        let updated = test
            .update_result(RecordKey(11), date("2024-03-05"), 15)
            .unwrap();
        assert_eq!(updated.total_germinated(), 25);
        assert_eq!(updated.viability_percent(), Some(Decimal::from(50)));
    }

    #[test]
    fn test_scheduled_tests_excluded_from_summary() {
        let today = date("2024-06-01");
        let active = test_with(50, &[10], "2024-05-01");
        let mut scheduled = test_with(40, &[], "2024-06-02");
        scheduled.key = RecordKey(2);

        let tests = vec![active.clone(), scheduled];
        let summary = most_recent_viability(&tests, today).unwrap();
        assert_eq!(summary.test_key, active.key);
        assert_eq!(summary.viability_percent, Decimal::from(20));
        assert_eq!(seeds_scheduled_for_testing(&tests, today), 40);
    }

    #[test]
    fn test_most_recent_prefers_latest_start() {
        let today = date("2024-06-01");
        let older = test_with(10, &[10], "2024-01-01");
        let mut newer = test_with(10, &[5], "2024-04-01");
        newer.key = RecordKey(2);
        let summary = most_recent_viability(&[older, newer], today).unwrap();
        assert_eq!(summary.test_key, RecordKey(2));
        assert_eq!(summary.viability_percent, Decimal::from(50));
    }
}
