//! Business logic services for the Seed Bank Accession Platform

pub mod accession;
pub mod reference;

pub use accession::AccessionService;
pub use reference::ReferenceDataService;
