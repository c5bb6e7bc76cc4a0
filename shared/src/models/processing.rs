//! Processing records and the subsample seed-count estimator

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::quantity::{Quantity, Unit, UnitFamily};

/// How an accession's seed stock is accounted for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    Count,
    Weight,
}

impl ProcessingMethod {
    /// Unit family every quantity of this method must use
    pub fn family(&self) -> UnitFamily {
        match self {
            ProcessingMethod::Count => UnitFamily::Count,
            ProcessingMethod::Weight => UnitFamily::Weight,
        }
    }

    fn representative_unit(&self) -> Unit {
        match self {
            ProcessingMethod::Count => Unit::Seeds,
            ProcessingMethod::Weight => Unit::Grams,
        }
    }
}

impl std::fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingMethod::Count => write!(f, "Count"),
            ProcessingMethod::Weight => write!(f, "Weight"),
        }
    }
}

/// Processing information; only the fields of the active method exist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ProcessingRecord {
    Count {
        initial_quantity: Option<Quantity>,
    },
    Weight {
        initial_quantity: Option<Quantity>,
        subset_weight: Option<Quantity>,
        subset_count: Option<u32>,
    },
}

impl ProcessingRecord {
    /// An empty record for the given method
    pub fn new(method: ProcessingMethod) -> Self {
        match method {
            ProcessingMethod::Count => ProcessingRecord::Count {
                initial_quantity: None,
            },
            ProcessingMethod::Weight => ProcessingRecord::Weight {
                initial_quantity: None,
                subset_weight: None,
                subset_count: None,
            },
        }
    }

    pub fn method(&self) -> ProcessingMethod {
        match self {
            ProcessingRecord::Count { .. } => ProcessingMethod::Count,
            ProcessingRecord::Weight { .. } => ProcessingMethod::Weight,
        }
    }

    pub fn initial_quantity(&self) -> Option<Quantity> {
        match self {
            ProcessingRecord::Count { initial_quantity }
            | ProcessingRecord::Weight {
                initial_quantity, ..
            } => *initial_quantity,
        }
    }

    pub fn subset(&self) -> Option<(Quantity, u32)> {
        match self {
            ProcessingRecord::Weight {
                subset_weight: Some(weight),
                subset_count: Some(count),
                ..
            } => Some((*weight, *count)),
            _ => None,
        }
    }

    /// Switch the accounting method.
    ///
    /// Weight to count drops every recorded quantity; count to weight drops the
    /// initial quantity. Selecting the current method keeps the record as is.
    pub fn set_method(&self, method: ProcessingMethod) -> ProcessingRecord {
        if self.method() == method {
            return self.clone();
        }
        ProcessingRecord::new(method)
    }

    /// Record the initial quantity; its unit must match the processing method
    pub fn with_initial_quantity(&self, quantity: Quantity) -> DomainResult<ProcessingRecord> {
        self.check_family(&quantity)?;
        let mut next = self.clone();
        match &mut next {
            ProcessingRecord::Count { initial_quantity }
            | ProcessingRecord::Weight {
                initial_quantity, ..
            } => *initial_quantity = Some(quantity),
        }
        Ok(next)
    }

    /// Record the weighed subsample used for estimation (weight-based only)
    pub fn with_subset(&self, weight: Option<Quantity>, count: Option<u32>) -> DomainResult<ProcessingRecord> {
        match self {
            ProcessingRecord::Count { .. } => Err(DomainError::InvalidField {
                field: "subset_weight",
                message: "Subset measurements only apply to weight-based processing".to_string(),
            }),
            ProcessingRecord::Weight {
                initial_quantity, ..
            } => {
                if let Some(weight) = &weight {
                    self.check_family(weight)?;
                }
                Ok(ProcessingRecord::Weight {
                    initial_quantity: *initial_quantity,
                    subset_weight: weight,
                    subset_count: count,
                })
            }
        }
    }

    /// Estimated total seed count, if the subsample data is complete
    pub fn estimate(&self) -> Option<Decimal> {
        estimate(self)
    }

    /// Estimated seed count for a weight currently on hand
    pub fn estimate_remaining_count(&self, remaining: &Quantity) -> Option<Decimal> {
        let (subset_weight, subset_count) = self.subset()?;
        let subset_weight = subset_weight.convert(remaining.unit).ok()?;
        estimate_seed_count(subset_count, remaining.value, subset_weight.value)
    }

    fn check_family(&self, quantity: &Quantity) -> DomainResult<()> {
        let method = self.method();
        if quantity.family() != method.family() {
            return Err(DomainError::UnitFamilyMismatch {
                from: quantity.unit,
                to: method.representative_unit(),
            });
        }
        Ok(())
    }
}

/// Estimated seed count for a weight-based record.
///
/// `None` until initial quantity, subset weight and subset count are all
/// present and the subset weight is non-zero. A subset weighed in a different
/// unit is scaled to the initial quantity's unit first.
pub fn estimate(record: &ProcessingRecord) -> Option<Decimal> {
    let initial = record.initial_quantity()?;
    let (subset_weight, subset_count) = record.subset()?;
    let subset_weight = subset_weight.convert(initial.unit).ok()?;
    estimate_seed_count(subset_count, initial.value, subset_weight.value)
}

/// subset_count * total_weight / subset_weight
pub fn estimate_seed_count(
    subset_count: u32,
    total_weight: Decimal,
    subset_weight: Decimal,
) -> Option<Decimal> {
    if subset_weight <= Decimal::ZERO {
        return None;
    }
    Decimal::from(subset_count)
        .checked_mul(total_weight)?
        .checked_div(subset_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grams(value: i64) -> Quantity {
        Quantity::new(Decimal::from(value), Unit::Grams).unwrap()
    }

    fn weighed(initial: i64, subset: i64, count: u32) -> ProcessingRecord {
        ProcessingRecord::new(ProcessingMethod::Weight)
            .with_initial_quantity(grams(initial))
            .unwrap()
            .with_subset(Some(grams(subset)), Some(count))
            .unwrap()
    }

    #[test]
    fn test_estimate_example() {
        assert_eq!(weighed(500, 10, 42).estimate(), Some(Decimal::from(2100)));
    }

    #[test]
    fn test_estimate_incomplete_is_none() {
        let record = ProcessingRecord::new(ProcessingMethod::Weight)
            .with_initial_quantity(grams(500))
            .unwrap();
        assert_eq!(record.estimate(), None);

        let no_count = record.with_subset(Some(grams(10)), None).unwrap();
        assert_eq!(no_count.estimate(), None);
    }

    #[test]
    fn test_estimate_zero_subset_weight_is_none() {
        assert_eq!(weighed(500, 0, 42).estimate(), None);
    }

    #[test]
    fn test_estimate_scales_subset_unit() {
        let record = ProcessingRecord::new(ProcessingMethod::Weight)
            .with_initial_quantity(Quantity::new(Decimal::from(2), Unit::Kilograms).unwrap())
            .unwrap()
            .with_subset(Some(grams(10)), Some(50))
            .unwrap();
        // 10 g is 0.01 kg: 50 * 2 / 0.01
        assert_eq!(record.estimate(), Some(Decimal::from(10000)));
    }

    #[test]
    fn test_weight_to_count_clears_everything() {
        let record = weighed(500, 10, 42).set_method(ProcessingMethod::Count);
        assert_eq!(
            record,
            ProcessingRecord::Count {
                initial_quantity: None
            }
        );
    }

    #[test]
    fn test_count_to_weight_clears_initial_quantity() {
        let record = ProcessingRecord::new(ProcessingMethod::Count)
            .with_initial_quantity(Quantity::seeds(300))
            .unwrap()
            .set_method(ProcessingMethod::Weight);
        assert_eq!(record.initial_quantity(), None);
        assert_eq!(record.method(), ProcessingMethod::Weight);
    }

    #[test]
    fn test_same_method_keeps_fields() {
        let record = weighed(500, 10, 42);
        assert_eq!(record.set_method(ProcessingMethod::Weight), record);
    }

    #[test]
    fn test_initial_quantity_must_match_method() {
        let count = ProcessingRecord::new(ProcessingMethod::Count);
        assert!(matches!(
            count.with_initial_quantity(grams(5)),
            Err(DomainError::UnitFamilyMismatch { .. })
        ));
        let weight = ProcessingRecord::new(ProcessingMethod::Weight);
        assert!(weight.with_initial_quantity(Quantity::seeds(5)).is_err());
    }

    #[test]
    fn test_subset_rejected_for_count_method() {
        let count = ProcessingRecord::new(ProcessingMethod::Count);
        assert!(count.with_subset(Some(grams(1)), Some(3)).is_err());
    }

    #[test]
    fn test_estimate_remaining_count() {
        let record = weighed(500, 10, 42);
        let remaining = grams(100);
        assert_eq!(
            record.estimate_remaining_count(&remaining),
            Some(Decimal::from(420))
        );
    }

    #[test]
    fn test_serde_tagged_shape() {
        let json = serde_json::to_value(weighed(500, 10, 42)).unwrap();
        assert_eq!(json["method"], "weight");
        assert_eq!(json["subset_count"], 42);
    }
}
