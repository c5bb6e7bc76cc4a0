//! HTTP handlers

pub mod accession;
pub mod health;
pub mod reference;
pub mod viability;
pub mod withdrawal;

pub use accession::*;
pub use health::*;
pub use reference::*;
pub use viability::*;
pub use withdrawal::*;
