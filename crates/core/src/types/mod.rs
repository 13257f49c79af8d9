//! Core types for the Brazilian customer hygiene tools.
//!
//! This module provides type-safe wrappers and the plain data records the
//! reconciliation passes operate on.

pub mod customer;
pub mod id;
pub mod outcome;

pub use customer::{Address, Customer};
pub use id::*;
pub use outcome::{AddressOutcome, ReconcileSummary, SanitizeOutcome, ValidationOutcome};
