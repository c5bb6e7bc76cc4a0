//! Domain errors raised by the accession model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::quantity::Unit;
use crate::types::RecordKey;

/// Errors signalled by quantity arithmetic and accession mutators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Count and weight units never convert into each other
    #[error("Cannot convert {from} to {to}: units belong to different families")]
    UnitFamilyMismatch { from: Unit, to: Unit },

    #[error("{field} would become negative ({available} available, {requested} requested)")]
    NegativeQuantity {
        field: &'static str,
        available: Decimal,
        requested: Decimal,
    },

    #[error("{field} is required")]
    RequiredFieldMissing { field: &'static str },

    #[error("{field} cannot be later than today ({date})")]
    FutureDateRejected { field: &'static str, date: NaiveDate },

    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("{kind} {key} not found")]
    RecordNotFound { kind: &'static str, key: RecordKey },

    #[error("Withdrawal {key} cannot be undone; only nursery transfers support undo")]
    UndoNotPermitted { key: RecordKey },

    #[error("Purpose '{purpose}' is reserved for system-created withdrawals")]
    ReservedPurpose { purpose: String },
}

impl DomainError {
    /// Name of the form field the error should be shown against, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DomainError::NegativeQuantity { field, .. }
            | DomainError::RequiredFieldMissing { field }
            | DomainError::FutureDateRejected { field, .. }
            | DomainError::InvalidField { field, .. } => Some(field),
            DomainError::ReservedPurpose { .. } => Some("purpose"),
            DomainError::UnitFamilyMismatch { .. }
            | DomainError::RecordNotFound { .. }
            | DomainError::UndoNotPermitted { .. } => None,
        }
    }

    /// Whether the user can fix the problem by correcting a field value
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DomainError::UnitFamilyMismatch { .. })
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::UnitFamilyMismatch { .. } => "UNIT_FAMILY_MISMATCH",
            DomainError::NegativeQuantity { .. } => "NEGATIVE_QUANTITY",
            DomainError::RequiredFieldMissing { .. } => "REQUIRED_FIELD_MISSING",
            DomainError::FutureDateRejected { .. } => "FUTURE_DATE_REJECTED",
            DomainError::InvalidField { .. } => "INVALID_FIELD",
            DomainError::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            DomainError::UndoNotPermitted { .. } => "UNDO_NOT_PERMITTED",
            DomainError::ReservedPurpose { .. } => "RESERVED_PURPOSE",
        }
    }
}

/// Result alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
