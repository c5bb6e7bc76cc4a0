//! Withdrawal records and the remaining-quantity ledger

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::quantity::Quantity;
use crate::types::RecordKey;

/// Why seed stock left the accession
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalPurpose {
    Propagation,
    OutReach,
    Research,
    Broadcast,
    Share,
    Other,
    /// Created by sending seeds to the nursery
    NurseryTransfer,
    /// Created by sowing a viability test
    ViabilityTesting,
}

impl WithdrawalPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalPurpose::Propagation => "propagation",
            WithdrawalPurpose::OutReach => "out_reach",
            WithdrawalPurpose::Research => "research",
            WithdrawalPurpose::Broadcast => "broadcast",
            WithdrawalPurpose::Share => "share",
            WithdrawalPurpose::Other => "other",
            WithdrawalPurpose::NurseryTransfer => "nursery_transfer",
            WithdrawalPurpose::ViabilityTesting => "viability_testing",
        }
    }

    /// Reserved purposes are never entered or edited by hand
    pub fn is_reserved(&self) -> bool {
        matches!(self, WithdrawalPurpose::ViabilityTesting)
    }

    pub fn supports_undo(&self) -> bool {
        matches!(self, WithdrawalPurpose::NurseryTransfer)
    }

    /// Purposes a user can pick when recording a withdrawal
    pub fn selectable() -> &'static [WithdrawalPurpose] {
        &[
            WithdrawalPurpose::Propagation,
            WithdrawalPurpose::OutReach,
            WithdrawalPurpose::Research,
            WithdrawalPurpose::Broadcast,
            WithdrawalPurpose::Share,
            WithdrawalPurpose::Other,
            WithdrawalPurpose::NurseryTransfer,
        ]
    }
}

impl std::fmt::Display for WithdrawalPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalPurpose::Propagation => write!(f, "Propagation"),
            WithdrawalPurpose::OutReach => write!(f, "Outreach or Education"),
            WithdrawalPurpose::Research => write!(f, "Research"),
            WithdrawalPurpose::Broadcast => write!(f, "Broadcast"),
            WithdrawalPurpose::Share => write!(f, "Share with Another Site"),
            WithdrawalPurpose::Other => write!(f, "Other"),
            WithdrawalPurpose::NurseryTransfer => write!(f, "Nursery Transfer"),
            WithdrawalPurpose::ViabilityTesting => write!(f, "Viability Testing"),
        }
    }
}

/// A removal of seed stock; future-dated withdrawals are scheduled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Withdrawal {
    pub key: RecordKey,
    pub date: NaiveDate,
    pub purpose: WithdrawalPurpose,
    pub withdrawn_quantity: Quantity,
    /// Balance after this withdrawal, in the accession's unit
    pub remaining_quantity: Quantity,
    pub destination: Option<String>,
    pub staff_responsible: Option<String>,
    pub notes: Option<String>,
    /// Viability test that produced this withdrawal
    pub test_key: Option<RecordKey>,
}

impl Withdrawal {
    pub fn is_scheduled(&self, today: NaiveDate) -> bool {
        self.date > today
    }
}

/// How much to withdraw
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "quantity", rename_all = "snake_case")]
pub enum WithdrawalAmount {
    Exact(Quantity),
    /// Everything still available, resolved against the balance when applied
    Remaining,
}

/// Input for recording or editing a withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWithdrawal {
    pub date: NaiveDate,
    pub purpose: WithdrawalPurpose,
    pub amount: WithdrawalAmount,
    pub destination: Option<String>,
    pub staff_responsible: Option<String>,
    pub notes: Option<String>,
}

/// Read-only view folding withdrawals against the initial quantity.
///
/// Every figure is recomputed from the full entry list on each call.
#[derive(Debug, Clone, Copy)]
pub struct Ledger<'a> {
    pub initial: Quantity,
    pub entries: &'a [Withdrawal],
}

impl<'a> Ledger<'a> {
    pub fn new(initial: Quantity, entries: &'a [Withdrawal]) -> Self {
        Self { initial, entries }
    }

    /// Initial quantity minus every withdrawal that has already happened
    pub fn balance(&self, today: NaiveDate) -> DomainResult<Quantity> {
        let taken = self.total_where(|w| !w.is_scheduled(today))?;
        self.initial.subtract(&taken)
    }

    /// Initial quantity minus every withdrawal, scheduled ones included
    pub fn projected(&self) -> DomainResult<Quantity> {
        let taken = self.total_where(|_| true)?;
        self.initial.subtract(&taken)
    }

    /// Projected balance ignoring one entry, used when that entry is edited
    pub fn projected_without(&self, key: RecordKey) -> DomainResult<Quantity> {
        let taken = self.total_where(|w| w.key != key)?;
        self.initial.subtract(&taken)
    }

    /// Sum of future-dated withdrawals
    pub fn scheduled_total(&self, today: NaiveDate) -> DomainResult<Quantity> {
        self.total_where(|w| w.is_scheduled(today))
    }

    fn total_where<F>(&self, include: F) -> DomainResult<Quantity>
    where
        F: Fn(&Withdrawal) -> bool,
    {
        self.entries
            .iter()
            .filter(|w| include(w))
            .try_fold(Quantity::zero(self.initial.unit), |acc, w| {
                acc.add(&w.withdrawn_quantity)
            })
    }
}

/// Recompute every entry's balance snapshot as a running total in date order
pub fn restate_snapshots(initial: &Quantity, entries: &mut [Withdrawal]) -> DomainResult<()> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| (entries[i].date, entries[i].key));

    let mut balance = *initial;
    for i in order {
        balance = balance.subtract(&entries[i].withdrawn_quantity)?;
        entries[i].remaining_quantity = balance;
    }
    Ok(())
}

/// Resolve the requested amount against the available balance
pub fn resolve_amount(amount: WithdrawalAmount, available: &Quantity) -> DomainResult<Quantity> {
    let quantity = match amount {
        WithdrawalAmount::Remaining => *available,
        WithdrawalAmount::Exact(quantity) => quantity,
    };
    if quantity.value < Decimal::ZERO {
        return Err(DomainError::NegativeQuantity {
            field: "withdrawn_quantity",
            available: available.value,
            requested: quantity.value,
        });
    }
    if quantity.is_zero() {
        return Err(DomainError::InvalidField {
            field: "withdrawn_quantity",
            message: "Withdrawn quantity must be greater than zero".to_string(),
        });
    }
    // Fails on a cross-family amount and on overdrawing
    available.subtract(&quantity)?;
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use crate::quantity::Unit;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn withdrawal(key: u64, on: &str, quantity: Quantity) -> Withdrawal {
        Withdrawal {
            key: RecordKey(key),
            date: date(on),
            purpose: WithdrawalPurpose::Research,
            withdrawn_quantity: quantity,
            remaining_quantity: Quantity::zero(quantity.unit),
            destination: None,
            staff_responsible: None,
            notes: None,
            test_key: None,
        }
    }

    #[test]
    fn test_balance_excludes_scheduled() {
        let today = date("2024-06-01");
        let entries = vec![
            withdrawal(1, "2024-05-01", Quantity::seeds(10)),
            withdrawal(2, "2024-06-02", Quantity::seeds(25)),
        ];
        let ledger = Ledger::new(Quantity::seeds(100), &entries);
        assert_eq!(ledger.balance(today).unwrap(), Quantity::seeds(90));
        assert_eq!(ledger.scheduled_total(today).unwrap(), Quantity::seeds(25));
        assert_eq!(ledger.projected().unwrap(), Quantity::seeds(65));
    }

    #[test]
    fn test_balance_converts_to_initial_unit() {
        let today = date("2024-06-01");
        let entries = vec![withdrawal(
            1,
            "2024-05-01",
            Quantity::new(Decimal::from(250), Unit::Grams).unwrap(),
        )];
        let initial = Quantity::new(Decimal::from(2), Unit::Kilograms).unwrap();
        let balance = Ledger::new(initial, &entries).balance(today).unwrap();
        assert_eq!(balance.unit, Unit::Kilograms);
        assert_eq!(balance.value, Decimal::from_str("1.75").unwrap());
    }

    #[test]
    fn test_resolve_remaining_takes_everything() {
        let available = Quantity::seeds(30);
        let taken = resolve_amount(WithdrawalAmount::Remaining, &available).unwrap();
        assert_eq!(taken, Quantity::seeds(30));
    }

    #[test]
    fn test_resolve_rejects_overdraw() {
        let available = Quantity::seeds(5);
        let err = resolve_amount(WithdrawalAmount::Exact(Quantity::seeds(12)), &available)
            .unwrap_err();
        assert!(matches!(err, DomainError::NegativeQuantity { .. }));
    }

    #[test]
    fn test_resolve_rejects_zero_and_wrong_family() {
        let available = Quantity::seeds(5);
        assert!(resolve_amount(WithdrawalAmount::Exact(Quantity::seeds(0)), &available).is_err());
        let grams = Quantity::new(Decimal::ONE, Unit::Grams).unwrap();
        assert!(matches!(
            resolve_amount(WithdrawalAmount::Exact(grams), &available),
            Err(DomainError::UnitFamilyMismatch { .. })
        ));
    }

    #[test]
    fn test_restate_snapshots_in_date_order() {
        let mut entries = vec![
            withdrawal(1, "2024-05-10", Quantity::seeds(10)),
            withdrawal(2, "2024-05-01", Quantity::seeds(20)),
        ];
        restate_snapshots(&Quantity::seeds(100), &mut entries).unwrap();
        assert_eq!(entries[1].remaining_quantity, Quantity::seeds(80));
        assert_eq!(entries[0].remaining_quantity, Quantity::seeds(70));
    }

    #[test]
    fn test_reserved_purposes() {
        assert!(WithdrawalPurpose::ViabilityTesting.is_reserved());
        assert!(!WithdrawalPurpose::selectable().contains(&WithdrawalPurpose::ViabilityTesting));
        assert!(WithdrawalPurpose::NurseryTransfer.supports_undo());
        assert!(!WithdrawalPurpose::Research.supports_undo());
    }
}
