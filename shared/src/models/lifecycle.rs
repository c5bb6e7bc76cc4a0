//! Accession lifecycle: state derivation and edit gating

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accession::Accession;
use super::viability::{most_recent_viability, seeds_scheduled_for_testing, ViabilitySummary};
use super::withdrawal::WithdrawalPurpose;
use crate::quantity::Quantity;
use crate::types::Role;

/// Where an accession is in the seed bank workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AccessionState {
    Pending,
    AwaitingCheckIn,
    Processing,
    Processed,
    Drying,
    Dried,
    InStorage,
    Nursery,
    Withdrawn,
}

impl AccessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessionState::Pending => "pending",
            AccessionState::AwaitingCheckIn => "awaiting_check_in",
            AccessionState::Processing => "processing",
            AccessionState::Processed => "processed",
            AccessionState::Drying => "drying",
            AccessionState::Dried => "dried",
            AccessionState::InStorage => "in_storage",
            AccessionState::Nursery => "nursery",
            AccessionState::Withdrawn => "withdrawn",
        }
    }
}

impl std::fmt::Display for AccessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessionState::Pending => write!(f, "Pending"),
            AccessionState::AwaitingCheckIn => write!(f, "Awaiting Check-In"),
            AccessionState::Processing => write!(f, "Processing"),
            AccessionState::Processed => write!(f, "Processed"),
            AccessionState::Drying => write!(f, "Drying"),
            AccessionState::Dried => write!(f, "Dried"),
            AccessionState::InStorage => write!(f, "In Storage"),
            AccessionState::Nursery => write!(f, "Nursery"),
            AccessionState::Withdrawn => write!(f, "Withdrawn"),
        }
    }
}

/// Derive the state from which records are present.
///
/// The first matching rule wins. Withdrawals made for viability testing do
/// not count as the accession being withdrawn.
pub fn derive_state(accession: &Accession) -> AccessionState {
    if accession.nursery_start_date.is_some() {
        return AccessionState::Nursery;
    }
    if accession
        .withdrawals
        .iter()
        .any(|w| w.purpose != WithdrawalPurpose::ViabilityTesting)
    {
        return AccessionState::Withdrawn;
    }
    if accession.storage.is_recorded() {
        return AccessionState::InStorage;
    }
    if accession.drying.end_date.is_some() {
        return AccessionState::Dried;
    }
    if accession.drying.start_date.is_some() {
        return AccessionState::Drying;
    }
    if let Some(processing) = &accession.processing {
        return if crate::validation::validate_processing(processing).is_empty() {
            AccessionState::Processed
        } else {
            AccessionState::Processing
        };
    }
    initial_state(accession)
}

/// State of an accession before any processing data exists
pub fn initial_state(accession: &Accession) -> AccessionState {
    if accession.is_checked_in() {
        AccessionState::Pending
    } else {
        AccessionState::AwaitingCheckIn
    }
}

/// Groups of fields that are edited and saved together
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Collection,
    Processing,
    Drying,
    Storage,
    ViabilityTesting,
    Withdrawal,
    Nursery,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Collection,
        Section::Processing,
        Section::Drying,
        Section::Storage,
        Section::ViabilityTesting,
        Section::Withdrawal,
        Section::Nursery,
    ];
}

/// Role gate: contributors only touch collection data of pending accessions
pub fn role_allows(role: Role, state: AccessionState, section: Section) -> bool {
    match role {
        Role::Contributor => section == Section::Collection && state == AccessionState::Pending,
        Role::Manager | Role::Admin | Role::Owner => true,
    }
}

/// Role and check-in gate alone. Editing or undoing an existing record needs
/// only this; creating one also needs stock (see [`can_edit`]).
pub fn can_modify(accession: &Accession, role: Role, section: Section) -> bool {
    let state = derive_state(accession);
    state != AccessionState::AwaitingCheckIn && role_allows(role, state, section)
}

/// Whether `role` may edit `section` of the accession as it stands today
pub fn can_edit(accession: &Accession, role: Role, section: Section, today: NaiveDate) -> bool {
    if !can_modify(accession, role, section) {
        return false;
    }
    match section {
        Section::Collection | Section::Processing | Section::Drying | Section::Storage => true,
        Section::ViabilityTesting => matches!(accession.remaining_quantity(today), Ok(Some(_))),
        Section::Withdrawal | Section::Nursery => has_stock(accession),
    }
}

pub fn editable_sections(accession: &Accession, role: Role, today: NaiveDate) -> Vec<Section> {
    Section::ALL
        .into_iter()
        .filter(|section| can_edit(accession, role, *section, today))
        .collect()
}

/// New withdrawals are offered only while stock is left
pub fn can_create_withdrawal(accession: &Accession, role: Role, today: NaiveDate) -> bool {
    can_edit(accession, role, Section::Withdrawal, today)
}

fn has_stock(accession: &Accession) -> bool {
    matches!(accession.projected_quantity(), Ok(Some(q)) if q.value > Decimal::ZERO)
}

/// Read-only projection shown alongside an accession
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessionView {
    pub state: AccessionState,
    pub remaining_quantity: Option<Quantity>,
    pub scheduled_withdrawals: Option<Quantity>,
    pub estimated_seed_count: Option<Decimal>,
    pub estimated_remaining_count: Option<Decimal>,
    pub most_recent_viability: Option<ViabilitySummary>,
    pub seeds_scheduled_for_testing: u64,
    pub editable_sections: Vec<Section>,
    pub can_create_withdrawal: bool,
    /// Set when the withdrawal ledger cannot be folded; quantities are then withheld
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_error: Option<String>,
}

impl AccessionView {
    pub fn build(accession: &Accession, role: Role, today: NaiveDate) -> Self {
        let remaining = accession.remaining_quantity(today);
        let scheduled = accession.scheduled_withdrawal_total(today);
        let balance_error = match (&remaining, &scheduled) {
            (Err(e), _) | (_, Err(e)) => Some(e.to_string()),
            _ => None,
        };
        let remaining = remaining.ok().flatten();
        let processing = accession.processing.as_ref();
        Self {
            state: derive_state(accession),
            remaining_quantity: remaining,
            scheduled_withdrawals: scheduled.ok().flatten(),
            estimated_seed_count: processing.and_then(|p| p.estimate()),
            estimated_remaining_count: processing
                .zip(remaining)
                .and_then(|(p, r)| p.estimate_remaining_count(&r)),
            most_recent_viability: most_recent_viability(&accession.viability_tests, today),
            seeds_scheduled_for_testing: seeds_scheduled_for_testing(
                &accession.viability_tests,
                today,
            ),
            editable_sections: editable_sections(accession, role, today),
            can_create_withdrawal: can_create_withdrawal(accession, role, today),
            balance_error,
        }
    }
}
