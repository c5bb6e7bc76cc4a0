//! Shared domain model for the Seed Bank Accession Platform
//!
//! Quantity accounting, processing estimates, viability tests, the withdrawal
//! ledger and the accession lifecycle. Used by the backend and, through
//! WASM, by the browser forms. Nothing in this crate performs I/O.

pub mod clock;
pub mod error;
pub mod models;
pub mod quantity;
pub mod types;
pub mod validation;

pub use clock::*;
pub use error::*;
pub use models::*;
pub use quantity::*;
pub use types::*;
pub use validation::*;
