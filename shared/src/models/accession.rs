//! The accession aggregate and its mutators
//!
//! Every mutator takes `&self` and returns a new `Accession`; a rejected
//! mutation leaves the original untouched. Pre-conditions are checked with
//! the functions in [`crate::validation`] before anything is changed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lifecycle::{derive_state, AccessionState};
use super::processing::{ProcessingMethod, ProcessingRecord};
use super::viability::{NewViabilityTest, TestDetails, TestResult, ViabilityTest};
use super::withdrawal::{
    resolve_amount, restate_snapshots, Ledger, NewWithdrawal, Withdrawal, WithdrawalAmount,
    WithdrawalPurpose,
};
use crate::error::{DomainError, DomainResult};
use crate::quantity::{Quantity, UnitFamily};
use crate::types::{KeySequence, RecordKey};
use crate::validation::{
    validate_collection, validate_drying, validate_new_test, validate_new_withdrawal,
    validate_processing, validate_storage_date, validate_test_result, FieldErrors,
};

/// Accession number: PREFIX-YYYY-NNNNN
pub fn generate_accession_number(prefix: &str, year: i32, sequence: i64) -> String {
    format!("{}-{}-{:05}", prefix, year, sequence)
}

/// Where and when the seeds were collected
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionInfo {
    pub species: Option<String>,
    pub collectors: Vec<String>,
    pub collected_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub site_location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DryingDates {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Storage conditions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageCondition {
    Refrigerator,
    Freezer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageInfo {
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub condition: Option<StorageCondition>,
}

impl StorageInfo {
    pub fn is_recorded(&self) -> bool {
        self.location.is_some() || self.start_date.is_some()
    }
}

/// A seed collection tracked from collection through withdrawal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Accession {
    pub id: Uuid,
    pub accession_number: String,
    pub collection: CollectionInfo,
    /// Data entry waits for a physical check-in when set
    pub requires_check_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub processing: Option<ProcessingRecord>,
    pub drying: DryingDates,
    pub storage: StorageInfo,
    pub nursery_start_date: Option<NaiveDate>,
    pub viability_tests: Vec<ViabilityTest>,
    pub withdrawals: Vec<Withdrawal>,
    pub key_sequence: KeySequence,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Accession {
    pub fn new(accession_number: impl Into<String>, requires_check_in: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            accession_number: accession_number.into(),
            collection: CollectionInfo::default(),
            requires_check_in,
            checked_in_at: None,
            processing: None,
            drying: DryingDates::default(),
            storage: StorageInfo::default(),
            nursery_start_date: None,
            viability_tests: Vec::new(),
            withdrawals: Vec::new(),
            key_sequence: KeySequence::default(),
            created_at: now,
            updated_at: now,
        }
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    pub fn state(&self) -> AccessionState {
        derive_state(self)
    }

    pub fn is_checked_in(&self) -> bool {
        !self.requires_check_in || self.checked_in_at.is_some()
    }

    pub fn processing_method(&self) -> Option<ProcessingMethod> {
        self.processing.as_ref().map(ProcessingRecord::method)
    }

    pub fn initial_quantity(&self) -> Option<Quantity> {
        self.processing.as_ref()?.initial_quantity()
    }

    /// Balance fold over the current withdrawals, if processing recorded a quantity
    pub fn ledger(&self) -> Option<Ledger<'_>> {
        self.initial_quantity()
            .map(|initial| Ledger::new(initial, &self.withdrawals))
    }

    /// Stock available today; scheduled withdrawals are not deducted yet
    pub fn remaining_quantity(&self, today: NaiveDate) -> DomainResult<Option<Quantity>> {
        self.ledger().map(|l| l.balance(today)).transpose()
    }

    /// Stock left once every scheduled withdrawal has happened
    pub fn projected_quantity(&self) -> DomainResult<Option<Quantity>> {
        self.ledger().map(|l| l.projected()).transpose()
    }

    pub fn scheduled_withdrawal_total(&self, today: NaiveDate) -> DomainResult<Option<Quantity>> {
        self.ledger().map(|l| l.scheduled_total(today)).transpose()
    }

    pub fn withdrawal(&self, key: RecordKey) -> Option<&Withdrawal> {
        self.withdrawals.iter().find(|w| w.key == key)
    }

    pub fn viability_test(&self, key: RecordKey) -> Option<&ViabilityTest> {
        self.viability_tests.iter().find(|t| t.key == key)
    }

    // ------------------------------------------------------------------
    // Collection, check-in, drying, storage
    // ------------------------------------------------------------------

    pub fn check_in(&self, now: DateTime<Utc>) -> Accession {
        let mut next = self.clone();
        if next.checked_in_at.is_none() {
            next.checked_in_at = Some(now);
        }
        next.touch(now)
    }

    /// Save collection details.
    ///
    /// Dates later than today are not saved; they come back as warnings while
    /// the remaining fields are stored.
    pub fn update_collection(
        &self,
        info: CollectionInfo,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> (Accession, FieldErrors) {
        let warnings = validate_collection(&info, today);
        let mut info = info;
        if warnings.has_field("collected_date") {
            info.collected_date = self.collection.collected_date;
        }
        if warnings.has_field("received_date") {
            info.received_date = self.collection.received_date;
        }
        let mut next = self.clone();
        next.collection = info;
        (next.touch(now), warnings)
    }

    pub fn update_drying(&self, drying: DryingDates, now: DateTime<Utc>) -> DomainResult<Accession> {
        validate_drying(&drying).into_result()?;
        let mut next = self.clone();
        next.drying = drying;
        Ok(next.touch(now))
    }

    /// Save storage details; a future start date is kept back as a warning
    pub fn update_storage(
        &self,
        storage: StorageInfo,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> (Accession, FieldErrors) {
        let warnings = validate_storage_date(&storage, today);
        let mut storage = storage;
        if !warnings.is_empty() {
            storage.start_date = self.storage.start_date;
        }
        let mut next = self.clone();
        next.storage = storage;
        (next.touch(now), warnings)
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Choose count or weight accounting, discarding fields of the other method
    pub fn set_processing_method(
        &self,
        method: ProcessingMethod,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        let record = match &self.processing {
            Some(record) if record.method() == method => return Ok(self.clone()),
            Some(record) => {
                if !self.withdrawals.is_empty() || !self.viability_tests.is_empty() {
                    return Err(DomainError::InvalidField {
                        field: "processing_method",
                        message: "Processing method cannot change once withdrawals or tests exist"
                            .to_string(),
                    });
                }
                record.set_method(method)
            }
            None => ProcessingRecord::new(method),
        };
        let mut next = self.clone();
        next.processing = Some(record);
        Ok(next.touch(now))
    }

    pub fn record_initial_quantity(
        &self,
        quantity: Quantity,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        let record = self.processing_record()?.with_initial_quantity(quantity)?;
        validate_processing(&record).into_result()?;
        self.with_processing(record, now)
    }

    pub fn record_subset(
        &self,
        subset_weight: Option<Quantity>,
        subset_count: Option<u32>,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        let record = self
            .processing_record()?
            .with_subset(subset_weight, subset_count)?;
        validate_processing(&record).into_result()?;
        self.with_processing(record, now)
    }

    fn processing_record(&self) -> DomainResult<&ProcessingRecord> {
        self.processing
            .as_ref()
            .ok_or(DomainError::RequiredFieldMissing {
                field: "processing_method",
            })
    }

    fn with_processing(&self, record: ProcessingRecord, now: DateTime<Utc>) -> DomainResult<Accession> {
        let mut next = self.clone();
        next.processing = Some(record);
        next.restate()?;
        Ok(next.touch(now))
    }

    // ------------------------------------------------------------------
    // Withdrawals
    // ------------------------------------------------------------------

    /// Record a withdrawal against the available balance.
    ///
    /// The amount is checked against the projected balance, so a scheduled
    /// withdrawal can never overdraw stock once its date arrives. A nursery
    /// transfer also marks the accession as sent to the nursery.
    pub fn apply_withdrawal(
        &self,
        input: NewWithdrawal,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        validate_new_withdrawal(&input).into_result()?;
        let available = self.available_quantity()?;
        let withdrawn = resolve_amount(input.amount, &available)?;

        let mut next = self.clone();
        let key = next.key_sequence.next_key();
        if input.purpose == WithdrawalPurpose::NurseryTransfer && next.nursery_start_date.is_none() {
            next.nursery_start_date = Some(input.date);
        }
        next.withdrawals.push(Withdrawal {
            key,
            date: input.date,
            purpose: input.purpose,
            withdrawn_quantity: withdrawn,
            remaining_quantity: Quantity::zero(available.unit),
            destination: input.destination,
            staff_responsible: input.staff_responsible,
            notes: input.notes,
            test_key: None,
        });
        next.restate()?;
        Ok(next.touch(now))
    }

    /// Withdraw everything still available
    pub fn withdraw_remaining(
        &self,
        date: NaiveDate,
        purpose: WithdrawalPurpose,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        self.apply_withdrawal(
            NewWithdrawal {
                date,
                purpose,
                amount: WithdrawalAmount::Remaining,
                destination: None,
                staff_responsible: None,
                notes: None,
            },
            now,
        )
    }

    /// Edit a manually recorded withdrawal in place
    pub fn edit_withdrawal(
        &self,
        key: RecordKey,
        input: NewWithdrawal,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        let existing = self
            .withdrawal(key)
            .ok_or(DomainError::RecordNotFound {
                kind: "Withdrawal",
                key,
            })?;
        if existing.purpose.is_reserved() {
            return Err(DomainError::ReservedPurpose {
                purpose: existing.purpose.to_string(),
            });
        }
        validate_new_withdrawal(&input).into_result()?;

        let ledger = self.ledger().ok_or(DomainError::RequiredFieldMissing {
            field: "initial_quantity",
        })?;
        let available = ledger.projected_without(key)?;
        let withdrawn = resolve_amount(input.amount, &available)?;

        let mut next = self.clone();
        if input.purpose == WithdrawalPurpose::NurseryTransfer && next.nursery_start_date.is_none() {
            next.nursery_start_date = Some(input.date);
        }
        if let Some(entry) = next.withdrawals.iter_mut().find(|w| w.key == key) {
            entry.date = input.date;
            entry.purpose = input.purpose;
            entry.withdrawn_quantity = withdrawn;
            entry.destination = input.destination;
            entry.staff_responsible = input.staff_responsible;
            entry.notes = input.notes;
        }
        if !next.has_nursery_transfers() {
            next.nursery_start_date = None;
        }
        next.restate()?;
        Ok(next.touch(now))
    }

    /// Reverse a nursery transfer; other withdrawals are edited instead
    pub fn undo_withdrawal(&self, key: RecordKey, now: DateTime<Utc>) -> DomainResult<Accession> {
        let existing = self
            .withdrawal(key)
            .ok_or(DomainError::RecordNotFound {
                kind: "Withdrawal",
                key,
            })?;
        if !existing.purpose.supports_undo() {
            return Err(DomainError::UndoNotPermitted { key });
        }

        let mut next = self.clone();
        next.withdrawals.retain(|w| w.key != key);
        if !next.has_nursery_transfers() {
            next.nursery_start_date = None;
        }
        next.restate()?;
        Ok(next.touch(now))
    }

    /// Send seeds to the nursery as a nursery-transfer withdrawal
    pub fn transfer_to_nursery(
        &self,
        date: NaiveDate,
        amount: WithdrawalAmount,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        self.apply_withdrawal(
            NewWithdrawal {
                date,
                purpose: WithdrawalPurpose::NurseryTransfer,
                amount,
                destination: None,
                staff_responsible: None,
                notes,
            },
            now,
        )
    }

    /// Clear the nursery start date and give back every nursery transfer
    pub fn undo_send_to_nursery(&self, now: DateTime<Utc>) -> DomainResult<Accession> {
        let mut next = self.clone();
        next.nursery_start_date = None;
        next.withdrawals
            .retain(|w| w.purpose != WithdrawalPurpose::NurseryTransfer);
        next.restate()?;
        Ok(next.touch(now))
    }

    fn has_nursery_transfers(&self) -> bool {
        self.withdrawals
            .iter()
            .any(|w| w.purpose == WithdrawalPurpose::NurseryTransfer)
    }

    fn available_quantity(&self) -> DomainResult<Quantity> {
        self.ledger()
            .ok_or(DomainError::RequiredFieldMissing {
                field: "initial_quantity",
            })?
            .projected()
    }

    // ------------------------------------------------------------------
    // Viability tests
    // ------------------------------------------------------------------

    /// Sow a new test and take its seeds out of the balance.
    ///
    /// Counted accessions deduct `seeds_sown`. Weighed accessions take the
    /// remaining quantity entered by the user and deduct the difference.
    pub fn create_viability_test(
        &self,
        input: NewViabilityTest,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        let available = self.available_quantity()?;
        validate_new_test(&input, available.family()).into_result()?;

        let (withdrawn, remaining) = match available.family() {
            UnitFamily::Count => {
                let sown = Quantity::seeds(input.seeds_sown);
                let remaining = available.subtract(&sown)?;
                (sown, remaining)
            }
            UnitFamily::Weight => {
                let remaining = input
                    .remaining_quantity
                    .ok_or(DomainError::RequiredFieldMissing {
                        field: "remaining_quantity",
                    })?
                    .convert(available.unit)?;
                let withdrawn = available.subtract(&remaining).map_err(|_| {
                    DomainError::InvalidField {
                        field: "remaining_quantity",
                        message: format!("Remaining quantity cannot exceed {}", available),
                    }
                })?;
                (withdrawn, remaining)
            }
        };

        let mut next = self.clone();
        let test_key = next.key_sequence.next_key();
        next.viability_tests.push(ViabilityTest {
            key: test_key,
            test_type: input.test_type,
            seeds_sown: input.seeds_sown,
            start_date: input.start_date,
            remaining_quantity: remaining,
            substrate: input.substrate,
            treatment: input.treatment,
            notes: input.notes,
            test_results: Vec::new(),
        });
        if !withdrawn.is_zero() {
            let withdrawal_key = next.key_sequence.next_key();
            next.withdrawals.push(Withdrawal {
                key: withdrawal_key,
                date: input.start_date,
                purpose: WithdrawalPurpose::ViabilityTesting,
                withdrawn_quantity: withdrawn,
                remaining_quantity: remaining,
                destination: None,
                staff_responsible: None,
                notes: None,
                test_key: Some(test_key),
            });
        }
        next.restate()?;
        Ok(next.touch(now))
    }

    pub fn update_viability_test(
        &self,
        key: RecordKey,
        details: TestDetails,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        self.map_test(key, now, |test| Ok(test.with_details(details)))
    }

    /// Delete a test and return its seeds to the balance
    pub fn delete_viability_test(&self, key: RecordKey, now: DateTime<Utc>) -> DomainResult<Accession> {
        if self.viability_test(key).is_none() {
            return Err(DomainError::RecordNotFound {
                kind: "Viability test",
                key,
            });
        }
        let mut next = self.clone();
        next.viability_tests.retain(|t| t.key != key);
        next.withdrawals.retain(|w| w.test_key != Some(key));
        next.restate()?;
        Ok(next.touch(now))
    }

    pub fn record_test_result(
        &self,
        test_key: RecordKey,
        recording_date: NaiveDate,
        seeds_germinated: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        let mut sequence = self.key_sequence;
        let result_key = sequence.next_key();
        let mut next = self.map_test(test_key, now, |test| {
            validate_test_result(test, None, seeds_germinated).into_result()?;
            Ok(test.add_result(TestResult {
                key: result_key,
                recording_date,
                seeds_germinated,
            }))
        })?;
        next.key_sequence = sequence;
        Ok(next)
    }

    pub fn update_test_result(
        &self,
        test_key: RecordKey,
        result_key: RecordKey,
        recording_date: NaiveDate,
        seeds_germinated: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        self.map_test(test_key, now, |test| {
            validate_test_result(test, Some(result_key), seeds_germinated).into_result()?;
            test.update_result(result_key, recording_date, seeds_germinated)
        })
    }

    pub fn remove_test_result(
        &self,
        test_key: RecordKey,
        result_key: RecordKey,
        now: DateTime<Utc>,
    ) -> DomainResult<Accession> {
        self.map_test(test_key, now, |test| test.remove_result(result_key))
    }

    fn map_test<F>(&self, key: RecordKey, now: DateTime<Utc>, f: F) -> DomainResult<Accession>
    where
        F: FnOnce(&ViabilityTest) -> DomainResult<ViabilityTest>,
    {
        let index = self
            .viability_tests
            .iter()
            .position(|t| t.key == key)
            .ok_or(DomainError::RecordNotFound {
                kind: "Viability test",
                key,
            })?;
        let updated = f(&self.viability_tests[index])?;
        let mut next = self.clone();
        next.viability_tests[index] = updated;
        Ok(next.touch(now))
    }

    // ------------------------------------------------------------------

    /// Re-derive withdrawal snapshots from scratch and re-check non-negativity
    fn restate(&mut self) -> DomainResult<()> {
        if let Some(initial) = self.initial_quantity() {
            restate_snapshots(&initial, &mut self.withdrawals)?;
        }
        Ok(())
    }

    fn touch(mut self, now: DateTime<Utc>) -> Accession {
        self.updated_at = now;
        self
    }
}
