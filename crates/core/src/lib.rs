//! Brazilian Customer Core - Shared types and algorithms.
//!
//! This crate provides the types and pure algorithms used across the hygiene
//! tool components:
//! - `engine` - Reconciliation engine (audit log, repositories, passes)
//! - `cli` - Command-line driver for batch runs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access. Tax-id check digits, phone formatting, and name sanitation all live
//! here so they can be tested in isolation and reused anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the customer/address records
//! - [`taxid`] - CPF/CNPJ validation and canonical formatting
//! - [`phone`] - Brazilian phone number formatting
//! - [`sanitize`] - Name and email normalization primitives

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod phone;
pub mod sanitize;
pub mod taxid;
pub mod types;

pub use types::*;
