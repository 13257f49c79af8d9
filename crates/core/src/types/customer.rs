//! Customer and address records.
//!
//! Plain data records as read from the customer database. Persistence side
//! effects are explicit repository calls made by the engine; the records
//! themselves carry no storage hooks.

use serde::{Deserialize, Serialize};

use super::id::{AddressId, CustomerId};

/// A customer account.
///
/// `tax_id` holds whatever the shop collected: bare digits, a formatted
/// CPF/CNPJ, or garbage. Validation happens in the reconciliation pass, never
/// on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Primary key.
    pub id: CustomerId,
    /// Account email, not guaranteed normalized until the sanitize pass ran.
    pub email: String,
    /// First name as entered at registration.
    pub firstname: String,
    /// Last name as entered at registration.
    pub lastname: String,
    /// Raw CPF/CNPJ value; empty string when the shop never collected one.
    pub tax_id: String,
    /// Address promoted as the billing default, if any.
    pub default_billing: Option<AddressId>,
    /// Address promoted as the shipping default, if any.
    pub default_shipping: Option<AddressId>,
}

impl Customer {
    /// Whether the customer carries a non-empty tax id.
    #[must_use]
    pub fn has_tax_id(&self) -> bool {
        !self.tax_id.trim().is_empty()
    }

    /// Whether a default billing address is assigned.
    #[must_use]
    pub const fn has_default_billing(&self) -> bool {
        self.default_billing.is_some()
    }
}

/// A customer-owned address.
///
/// `street` is the ordered street-line sequence (line, number,
/// complement-or-neighborhood, ...). Brazilian addresses are only considered
/// well-formed with at least three lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Primary key.
    pub id: AddressId,
    /// Owning customer (parent id).
    pub customer_id: CustomerId,
    /// ISO 3166-1 alpha-2 country code ("BR" for Brazil).
    pub country_code: String,
    /// Ordered street lines.
    pub street: Vec<String>,
    /// Formatted CPF/CNPJ written back by the reconciler, if it ran.
    pub vat_id: Option<String>,
    /// Telephone number, formatted or raw.
    pub phone: String,
    /// Fax number, formatted or raw.
    pub fax: String,
}

impl Address {
    /// Minimum number of street lines a Brazilian address must carry.
    pub const MIN_BR_STREET_LINES: usize = 3;

    /// Whether this address belongs to Brazil.
    #[must_use]
    pub fn is_brazilian(&self) -> bool {
        self.country_code == "BR"
    }

    /// Whether the street-line structure satisfies the Brazilian minimum.
    #[must_use]
    pub fn has_valid_street(&self) -> bool {
        self.street.len() >= Self::MIN_BR_STREET_LINES
    }
}
