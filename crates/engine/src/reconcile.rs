//! Address and customer reconciliation.
//!
//! [`AddressReconciler`] runs the per-address state machine: validate the
//! customer's tax id, check the Brazilian street structure, format the phone
//! pair, persist, and promote. Addresses that cannot be fixed are deleted and
//! the reason is recorded in the failure audit stream.
//!
//! [`CustomerReconciler`] orchestrates a customer: when no default billing
//! address is assigned it promotes the first address on file and then runs the
//! address pass once over the updated record. The re-pass is a bounded
//! two-step sequence; the second step always sees an assigned default, so it
//! can never recurse further.

use brazilian_customer_core::phone::format_phone_pair;
use brazilian_customer_core::taxid::{TaxId, validate_tax_id};
use brazilian_customer_core::{
    Address, AddressOutcome, Customer, ReconcileSummary, ValidationOutcome,
};
use tracing::{debug, warn};

use crate::audit::{AuditLog, AuditRecord};
use crate::repository::{AddressRepository, CustomerRepository, RepositoryError};

/// Check the customer's raw tax id against the CPF/CNPJ rules.
fn tax_id_outcome(customer: &Customer) -> ValidationOutcome {
    if validate_tax_id(&customer.tax_id) {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid(format!("CPF/CNPJ invalid: {}", customer.tax_id))
    }
}

/// Check the Brazilian street-line minimum.
fn street_outcome(address: &Address) -> ValidationOutcome {
    if address.has_valid_street() {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid(format!(
            "Street Address invalid: {}",
            address.street.join(",")
        ))
    }
}

/// Per-address state machine.
pub struct AddressReconciler<'a, C, A> {
    customers: &'a C,
    addresses: &'a A,
    audit: &'a AuditLog,
}

impl<'a, C, A> AddressReconciler<'a, C, A>
where
    C: CustomerRepository,
    A: AddressRepository,
{
    /// Create a reconciler over the given repositories and audit sink.
    #[must_use]
    pub const fn new(customers: &'a C, addresses: &'a A, audit: &'a AuditLog) -> Self {
        Self {
            customers,
            addresses,
            audit,
        }
    }

    /// Run the state machine for one (customer, address) pair.
    ///
    /// Non-Brazilian addresses are skipped without validation or audit
    /// entries. Each address is visited at most once per pass; there are no
    /// retries.
    pub async fn process(&self, customer: &mut Customer, address: &mut Address) -> AddressOutcome {
        if !address.is_brazilian() {
            return AddressOutcome::Skipped;
        }

        if let ValidationOutcome::Invalid(reason) = tax_id_outcome(customer) {
            return self
                .purge(customer, address, reason, AddressOutcome::PurgedInvalidTaxId)
                .await;
        }

        if let ValidationOutcome::Invalid(reason) = street_outcome(address) {
            return self
                .purge(customer, address, reason, AddressOutcome::PurgedInvalidStreet)
                .await;
        }

        let (phone, fax) = format_phone_pair(&address.phone, &address.fax);
        address.phone = phone;
        address.fax = fax;

        // Already validated above; parse only to render the canonical string.
        let Ok(tax_id) = TaxId::parse(&customer.tax_id) else {
            return AddressOutcome::Skipped;
        };
        address.vat_id = Some(tax_id.formatted());

        if let Err(err) = self.addresses.save(address).await {
            return self
                .purge(
                    customer,
                    address,
                    err.to_string(),
                    AddressOutcome::PurgedOnSaveFailure,
                )
                .await;
        }

        self.audit.append(&AuditRecord::Success {
            customer_id: customer.id,
            email: customer.email.clone(),
            vat_id: tax_id.formatted(),
            phone: address.phone.clone(),
        });

        customer.default_billing = Some(address.id);
        customer.default_shipping = Some(address.id);
        if let Err(err) = self.customers.save(customer).await {
            // The address itself is committed; losing the default-slot update
            // is logged but does not fail the pass.
            warn!(
                customer_id = %customer.id,
                error = %err,
                "Failed to save customer after promoting address"
            );
            self.audit.append(&AuditRecord::Failure {
                customer_id: customer.id,
                email: customer.email.clone(),
                reason: err.to_string(),
            });
        }

        AddressOutcome::Committed
    }

    /// Delete the address (best-effort), record the failure, and return the
    /// terminal outcome.
    async fn purge(
        &self,
        customer: &Customer,
        address: &Address,
        reason: String,
        outcome: AddressOutcome,
    ) -> AddressOutcome {
        if let Err(err) = self.addresses.delete_by_id(address.id).await {
            warn!(
                address_id = %address.id,
                error = %err,
                "Failed to delete invalid address"
            );
        }
        self.audit.append(&AuditRecord::Failure {
            customer_id: customer.id,
            email: customer.email.clone(),
            reason,
        });
        outcome
    }
}

/// Per-customer orchestration.
pub struct CustomerReconciler<'a, C, A> {
    customers: &'a C,
    addresses: &'a A,
    audit: &'a AuditLog,
}

impl<'a, C, A> CustomerReconciler<'a, C, A>
where
    C: CustomerRepository,
    A: AddressRepository,
{
    /// Create a reconciler over the given repositories and audit sink.
    #[must_use]
    pub const fn new(customers: &'a C, addresses: &'a A, audit: &'a AuditLog) -> Self {
        Self {
            customers,
            addresses,
            audit,
        }
    }

    /// Reconcile one customer.
    ///
    /// Customers without a default billing address get the first address on
    /// file promoted before the address pass runs. Customers with a default
    /// but no tax id are left untouched and produce no audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] only when the address collection cannot be
    /// fetched; per-address persistence failures are handled internally.
    pub async fn process_customer(
        &self,
        customer: &mut Customer,
    ) -> Result<ReconcileSummary, RepositoryError> {
        let mut summary = ReconcileSummary::default();

        if !customer.has_default_billing() {
            if !self.assign_default_address(customer).await? {
                // No addresses on file: nothing to promote, nothing to audit.
                return Ok(summary);
            }
            summary.default_assigned = true;
            // Second step of the bounded sequence: the customer now has a
            // default billing address, so the address pass below is reached
            // exactly once more.
        }

        if !customer.has_tax_id() {
            debug!(customer_id = %customer.id, "Customer has no tax id, skipping");
            return Ok(summary);
        }

        let pass = self.process_addresses(customer).await?;
        summary.committed = pass.committed;
        summary.purged = pass.purged;
        Ok(summary)
    }

    /// Promote the first address on file to default billing and shipping.
    ///
    /// Returns `false` when the customer owns no addresses. A failed customer
    /// save is recorded in the failure audit stream and does not propagate.
    async fn assign_default_address(
        &self,
        customer: &mut Customer,
    ) -> Result<bool, RepositoryError> {
        let addresses = self.addresses.find_by_customer(customer.id).await?;
        let Some(first) = addresses.first() else {
            return Ok(false);
        };

        customer.default_billing = Some(first.id);
        customer.default_shipping = Some(first.id);

        if let Err(err) = self.customers.save(customer).await {
            warn!(
                customer_id = %customer.id,
                error = %err,
                "Failed to save customer while assigning default address"
            );
            self.audit.append(&AuditRecord::Failure {
                customer_id: customer.id,
                email: customer.email.clone(),
                reason: err.to_string(),
            });
        }

        Ok(true)
    }

    /// Run the address state machine over every Brazilian address.
    async fn process_addresses(
        &self,
        customer: &mut Customer,
    ) -> Result<ReconcileSummary, RepositoryError> {
        let mut summary = ReconcileSummary::default();
        let reconciler = AddressReconciler::new(self.customers, self.addresses, self.audit);

        for mut address in self.addresses.find_by_customer(customer.id).await? {
            match reconciler.process(customer, &mut address).await {
                AddressOutcome::Committed => summary.committed += 1,
                AddressOutcome::PurgedInvalidTaxId
                | AddressOutcome::PurgedInvalidStreet
                | AddressOutcome::PurgedOnSaveFailure => summary.purged += 1,
                AddressOutcome::Skipped => {}
            }
        }

        Ok(summary)
    }
}
