//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Surrogate key for records owned by an accession (tests, results, withdrawals)
///
/// Keys are only meaningful inside their parent accession.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordKey(pub u64);

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic key allocator stored with each accession snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct KeySequence(u64);

impl KeySequence {
    /// Allocate the next key, advancing the sequence
    pub fn next_key(&mut self) -> RecordKey {
        self.0 += 1;
        RecordKey(self.0)
    }

    pub fn last(&self) -> u64 {
        self.0
    }
}

/// Caller roles within a seed bank organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Contributor,
    Manager,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Contributor => "contributor",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contributor" => Some(Role::Contributor),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            "owner" => Some(Role::Owner),
            _ => None,
        }
    }
}
