//! Customer sanitation pass.
//!
//! Normalizes names and emails, saves the record, and - when enabled - hard
//! deletes customers whose records still cannot be saved. An independent
//! maintenance pass over the same customer stream as the reconciler.

use brazilian_customer_core::sanitize::{normalize_email, sanitize_name};
use brazilian_customer_core::{Customer, SanitizeOutcome};
use tracing::warn;

use crate::audit::{AuditLog, AuditRecord};
use crate::repository::CustomerRepository;

/// Options for the sanitize pass.
///
/// `delete_unsavable` is the explicit replacement for the host platform's
/// ambient secure-area flag: hard deletes only happen when the operator asked
/// for them on this run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizeOptions {
    /// Hard-delete customers whose sanitized record cannot be saved.
    pub delete_unsavable: bool,
}

/// Per-customer sanitation.
pub struct SanitizeConsumer<'a, C> {
    customers: &'a C,
    audit: &'a AuditLog,
    options: SanitizeOptions,
}

impl<'a, C> SanitizeConsumer<'a, C>
where
    C: CustomerRepository,
{
    /// Create a sanitize pass over the given repository and audit sink.
    #[must_use]
    pub const fn new(customers: &'a C, audit: &'a AuditLog, options: SanitizeOptions) -> Self {
        Self {
            customers,
            audit,
            options,
        }
    }

    /// Sanitize and save one customer.
    ///
    /// Names keep ASCII alphanumerics, spaces, and transliterated Portuguese
    /// accents; an empty sanitized lastname falls back to the firstname. The
    /// email is trimmed and lowercased. A failed save is recorded in the
    /// failure audit stream; with [`SanitizeOptions::delete_unsavable`] set
    /// the record is then hard-deleted, unconditionally and without a dry run.
    pub async fn process_customer(&self, customer: &mut Customer) -> SanitizeOutcome {
        let firstname = sanitize_name(&customer.firstname);
        let mut lastname = sanitize_name(&customer.lastname);
        if lastname.is_empty() {
            lastname = firstname.clone();
        }

        customer.firstname = firstname;
        customer.lastname = lastname;
        customer.email = normalize_email(&customer.email);

        match self.customers.save(customer).await {
            Ok(()) => SanitizeOutcome::Saved,
            Err(err) => {
                self.audit.append(&AuditRecord::Failure {
                    customer_id: customer.id,
                    email: customer.email.clone(),
                    reason: err.to_string(),
                });

                if self.options.delete_unsavable {
                    if let Err(err) = self.customers.delete(customer).await {
                        warn!(
                            customer_id = %customer.id,
                            error = %err,
                            "Failed to hard-delete unsavable customer"
                        );
                    }
                    SanitizeOutcome::Deleted
                } else {
                    SanitizeOutcome::SaveFailed
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brazilian_customer_core::CustomerId;

    use super::*;
    use crate::memory::MemoryRepository;

    fn customer(id: i64, firstname: &str, lastname: &str, email: &str) -> Customer {
        Customer {
            id: CustomerId::new(id),
            email: email.to_owned(),
            firstname: firstname.to_owned(),
            lastname: lastname.to_owned(),
            tax_id: String::new(),
            default_billing: None,
            default_shipping: None,
        }
    }

    fn read_errors(dir: &tempfile::TempDir) -> String {
        std::fs::read_to_string(dir.path().join("customer-errors.csv")).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_names_and_email_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MemoryRepository::new();
        let mut c = customer(1, "José™", "da Conceição!", "  User@Example.COM ");
        repo.insert_customer(c.clone());

        let audit = AuditLog::new(dir.path());
        let pass = SanitizeConsumer::new(&repo, &audit, SanitizeOptions::default());
        let outcome = pass.process_customer(&mut c).await;

        assert_eq!(outcome, SanitizeOutcome::Saved);
        let saved = repo.customer(CustomerId::new(1)).unwrap();
        assert_eq!(saved.firstname, "Jose");
        assert_eq!(saved.lastname, "da Conceicao");
        assert_eq!(saved.email, "user@example.com");
        assert!(read_errors(&dir).is_empty());
    }

    #[tokio::test]
    async fn test_empty_lastname_falls_back_to_firstname() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MemoryRepository::new();
        let mut c = customer(1, "Maria", "!!!", "m@example.com");
        repo.insert_customer(c.clone());

        let audit = AuditLog::new(dir.path());
        let pass = SanitizeConsumer::new(&repo, &audit, SanitizeOptions::default());
        pass.process_customer(&mut c).await;

        let saved = repo.customer(CustomerId::new(1)).unwrap();
        assert_eq!(saved.lastname, "Maria");
    }

    #[tokio::test]
    async fn test_save_failure_is_logged_and_record_kept() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MemoryRepository::new();
        let mut c = customer(1, "Ana", "Souza", "a@example.com");
        repo.insert_customer(c.clone());
        repo.fail_customer_saves(CustomerId::new(1));

        let audit = AuditLog::new(dir.path());
        let pass = SanitizeConsumer::new(&repo, &audit, SanitizeOptions::default());
        let outcome = pass.process_customer(&mut c).await;

        assert_eq!(outcome, SanitizeOutcome::SaveFailed);
        assert!(repo.customer(CustomerId::new(1)).is_some());
        assert!(read_errors(&dir).contains("injected save failure"));
    }

    #[tokio::test]
    async fn test_save_failure_with_delete_enabled_hard_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MemoryRepository::new();
        let mut c = customer(1, "Ana", "Souza", "a@example.com");
        repo.insert_customer(c.clone());
        repo.fail_customer_saves(CustomerId::new(1));

        let audit = AuditLog::new(dir.path());
        let pass = SanitizeConsumer::new(
            &repo,
            &audit,
            SanitizeOptions {
                delete_unsavable: true,
            },
        );
        let outcome = pass.process_customer(&mut c).await;

        assert_eq!(outcome, SanitizeOutcome::Deleted);
        assert!(repo.customer(CustomerId::new(1)).is_none());
        assert!(read_errors(&dir).contains("injected save failure"));
    }
}
