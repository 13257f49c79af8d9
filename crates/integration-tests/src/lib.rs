//! Integration tests for the Brazilian customer hygiene passes.
//!
//! The suites in `tests/` run whole passes - the same loop the CLI drives -
//! against the in-memory repository backend, with audit streams written to
//! tempfile directories. No database or network is required.
//!
//! This support crate provides record builders and audit-file readers shared
//! by the suites.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;

use brazilian_customer_core::{Address, AddressId, Customer, CustomerId};

/// A verified-valid CPF fixture.
pub const VALID_CPF: &str = "11144477735";

/// A verified-valid CNPJ fixture.
pub const VALID_CNPJ: &str = "11222333000181";

/// Build a customer with sensible defaults and the given tax id.
#[must_use]
pub fn customer(id: i64, tax_id: &str) -> Customer {
    Customer {
        id: CustomerId::new(id),
        email: format!("c{id}@example.com"),
        firstname: "Ana".to_owned(),
        lastname: "Souza".to_owned(),
        tax_id: tax_id.to_owned(),
        default_billing: None,
        default_shipping: None,
    }
}

/// Build a well-formed Brazilian address owned by `customer_id`.
#[must_use]
pub fn br_address(id: i64, customer_id: i64) -> Address {
    Address {
        id: AddressId::new(id),
        customer_id: CustomerId::new(customer_id),
        country_code: "BR".to_owned(),
        street: vec![
            "Rua das Flores".to_owned(),
            "100".to_owned(),
            "Centro".to_owned(),
        ],
        vat_id: None,
        phone: "11 98765 4321".to_owned(),
        fax: String::new(),
    }
}

/// Read the success stream (`customer-changes.csv`) as lines.
#[must_use]
pub fn changes_lines(dir: &Path) -> Vec<String> {
    read_lines(dir, "customer-changes.csv")
}

/// Read the failure stream (`customer-errors.csv`) as lines.
#[must_use]
pub fn errors_lines(dir: &Path) -> Vec<String> {
    read_lines(dir, "customer-errors.csv")
}

fn read_lines(dir: &Path, file: &str) -> Vec<String> {
    std::fs::read_to_string(dir.join(file))
        .unwrap_or_default()
        .lines()
        .map(ToOwned::to_owned)
        .collect()
}
