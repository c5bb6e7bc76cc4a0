//! Domain models for seed bank accessions

mod accession;
mod lifecycle;
mod processing;
mod viability;
mod withdrawal;

pub use accession::*;
pub use lifecycle::*;
pub use processing::*;
pub use viability::*;
pub use withdrawal::*;
