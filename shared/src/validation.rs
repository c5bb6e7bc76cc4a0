//! Pre-condition checks run before an accession is mutated
//!
//! Each check collects every problem it finds so a form can flag all of its
//! fields at once; mutators turn the first problem into an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{DomainError, DomainResult};
use crate::models::{
    CollectionInfo, DryingDates, NewViabilityTest, NewWithdrawal, ProcessingRecord, StorageInfo,
    ViabilityTest, WithdrawalAmount,
};
use crate::quantity::{Quantity, UnitFamily};
use crate::types::RecordKey;

/// Field-level problems found by a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<DomainError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: DomainError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Submitting a section is disabled while any error is outstanding
    pub fn can_submit(&self) -> bool {
        self.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == Some(field))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainError> {
        self.0.iter()
    }

    /// First error, if any
    pub fn into_result(self) -> DomainResult<()> {
        match self.0.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Flattened form for API responses
    pub fn to_details(&self) -> Vec<FieldErrorDetail> {
        self.0
            .iter()
            .map(|e| FieldErrorDetail {
                field: e.field().map(str::to_string),
                code: e.code().to_string(),
                message: e.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldErrorDetail {
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

/// Reject a date that lies after today
pub fn validate_not_future(field: &'static str, date: NaiveDate, today: NaiveDate) -> DomainResult<()> {
    if date > today {
        return Err(DomainError::FutureDateRejected { field, date });
    }
    Ok(())
}

pub fn validate_collection(info: &CollectionInfo, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(date) = info.collected_date {
        if let Err(e) = validate_not_future("collected_date", date, today) {
            errors.push(e);
        }
    }
    if let Some(date) = info.received_date {
        if let Err(e) = validate_not_future("received_date", date, today) {
            errors.push(e);
        }
    }
    errors
}

pub fn validate_storage_date(storage: &StorageInfo, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(date) = storage.start_date {
        if let Err(e) = validate_not_future("storage_start_date", date, today) {
            errors.push(e);
        }
    }
    errors
}

pub fn validate_drying(drying: &DryingDates) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match (drying.start_date, drying.end_date) {
        (None, Some(_)) => errors.push(DomainError::RequiredFieldMissing {
            field: "drying_start_date",
        }),
        (Some(start), Some(end)) if end < start => errors.push(DomainError::InvalidField {
            field: "drying_end_date",
            message: "Drying cannot end before it starts".to_string(),
        }),
        _ => {}
    }
    errors
}

fn negative(field: &'static str, quantity: &Quantity) -> DomainError {
    DomainError::NegativeQuantity {
        field,
        available: Decimal::ZERO,
        requested: quantity.value.abs(),
    }
}

/// Completeness of a processing record
pub fn validate_processing(record: &ProcessingRecord) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match record {
        ProcessingRecord::Count { initial_quantity } => match initial_quantity {
            None => errors.push(DomainError::RequiredFieldMissing {
                field: "initial_quantity",
            }),
            Some(q) if q.value < Decimal::ZERO => errors.push(negative("initial_quantity", q)),
            Some(_) => {}
        },
        ProcessingRecord::Weight {
            initial_quantity,
            subset_weight,
            subset_count,
        } => {
            match initial_quantity {
                Some(q) if q.value > Decimal::ZERO => {}
                _ => errors.push(DomainError::RequiredFieldMissing {
                    field: "initial_quantity",
                }),
            }
            match (subset_weight, subset_count) {
                (Some(_), None) => errors.push(DomainError::RequiredFieldMissing {
                    field: "subset_count",
                }),
                (None, Some(_)) => errors.push(DomainError::RequiredFieldMissing {
                    field: "subset_weight",
                }),
                (Some(weight), Some(_)) if weight.value <= Decimal::ZERO => {
                    errors.push(DomainError::InvalidField {
                        field: "subset_weight",
                        message: "Subset weight must be greater than zero".to_string(),
                    })
                }
                _ => {}
            }
        }
    }
    errors
}

pub fn validate_new_withdrawal(input: &NewWithdrawal) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if input.purpose.is_reserved() {
        errors.push(DomainError::ReservedPurpose {
            purpose: input.purpose.to_string(),
        });
    }
    if let WithdrawalAmount::Exact(quantity) = input.amount {
        if quantity.is_zero() {
            errors.push(DomainError::RequiredFieldMissing {
                field: "withdrawn_quantity",
            });
        }
    }
    errors
}

/// Checks for sowing a test from an accession of the given unit family
pub fn validate_new_test(input: &NewViabilityTest, family: UnitFamily) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if input.seeds_sown == 0 {
        errors.push(DomainError::RequiredFieldMissing {
            field: "seeds_sown",
        });
    }
    if family == UnitFamily::Weight {
        match input.remaining_quantity {
            None => errors.push(DomainError::RequiredFieldMissing {
                field: "remaining_quantity",
            }),
            Some(q) if q.family() != UnitFamily::Weight => {
                errors.push(DomainError::InvalidField {
                    field: "remaining_quantity",
                    message: "Remaining quantity must be a weight".to_string(),
                })
            }
            Some(q) if q.value < Decimal::ZERO => {
                errors.push(negative("remaining_quantity", &q))
            }
            Some(q) if q.is_zero() => errors.push(DomainError::RequiredFieldMissing {
                field: "remaining_quantity",
            }),
            Some(_) => {}
        }
    }
    errors
}

/// Germinated seeds across all results may not exceed the seeds sown
pub fn validate_test_result(
    test: &ViabilityTest,
    replacing: Option<RecordKey>,
    seeds_germinated: u32,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let others: u64 = test
        .test_results
        .iter()
        .filter(|r| Some(r.key) != replacing)
        .map(|r| u64::from(r.seeds_germinated))
        .sum();
    if others + u64::from(seeds_germinated) > u64::from(test.seeds_sown) {
        errors.push(DomainError::InvalidField {
            field: "seeds_germinated",
            message: format!(
                "Germinated seeds cannot exceed the {} seeds sown",
                test.seeds_sown
            ),
        });
    }
    errors
}

/// Existence check against a reference list (species, storage locations, collectors)
pub fn validate_reference(field: &'static str, value: &str, known: &[String]) -> DomainResult<()> {
    if known.iter().any(|k| k.eq_ignore_ascii_case(value)) {
        return Ok(());
    }
    Err(DomainError::InvalidField {
        field,
        message: format!("Unknown value '{}'", value),
    })
}
