//! Outcome types reported by the reconciliation and sanitation passes.

use serde::{Deserialize, Serialize};

/// Result of a single validation step.
///
/// Transient: returned to the caller and used to build audit reasons, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The value passed validation.
    Valid,
    /// The value failed validation, with the human-readable reason that ends
    /// up in the failure audit stream.
    Invalid(String),
}

impl ValidationOutcome {
    /// Whether this outcome is [`ValidationOutcome::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Terminal state of one address after a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressOutcome {
    /// Address saved with formatted data and promoted to the default slot.
    Committed,
    /// Purged: the customer's tax id failed CPF/CNPJ validation.
    PurgedInvalidTaxId,
    /// Purged: fewer street lines than the Brazilian minimum.
    PurgedInvalidStreet,
    /// Purged: the address save itself failed.
    PurgedOnSaveFailure,
    /// Not a Brazilian address; left untouched.
    Skipped,
}

impl AddressOutcome {
    /// Whether the address was deleted by the pass.
    #[must_use]
    pub const fn is_purged(&self) -> bool {
        matches!(
            self,
            Self::PurgedInvalidTaxId | Self::PurgedInvalidStreet | Self::PurgedOnSaveFailure
        )
    }
}

/// Per-customer summary returned by the reconciler, for driver progress
/// reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    /// Addresses committed with formatted data.
    pub committed: usize,
    /// Addresses purged for any reason.
    pub purged: usize,
    /// Whether a default billing/shipping address was assigned this pass.
    pub default_assigned: bool,
}

/// Terminal state of one customer after a sanitize pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizeOutcome {
    /// Sanitized record saved.
    Saved,
    /// Save failed; record kept and logged.
    SaveFailed,
    /// Save failed and the record was hard-deleted.
    Deleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_outcome() {
        assert!(ValidationOutcome::Valid.is_valid());
        assert!(!ValidationOutcome::Invalid("bad".to_owned()).is_valid());
    }

    #[test]
    fn test_purged_outcomes() {
        assert!(AddressOutcome::PurgedInvalidTaxId.is_purged());
        assert!(AddressOutcome::PurgedInvalidStreet.is_purged());
        assert!(AddressOutcome::PurgedOnSaveFailure.is_purged());
        assert!(!AddressOutcome::Committed.is_purged());
        assert!(!AddressOutcome::Skipped.is_purged());
    }
}
