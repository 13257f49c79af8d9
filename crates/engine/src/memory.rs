//! In-memory repository backend.
//!
//! Implements both persistence traits over mutex-guarded maps. Backs the unit
//! and integration test suites and works as a dry-run target; save failures
//! can be injected per record to exercise the purge-and-log paths.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};

use brazilian_customer_core::{Address, AddressId, Customer, CustomerId};

use crate::repository::{AddressRepository, CustomerRepository, RepositoryError};

#[derive(Debug, Default)]
struct State {
    customers: BTreeMap<CustomerId, Customer>,
    addresses: BTreeMap<AddressId, Address>,
    failing_customer_saves: HashSet<CustomerId>,
    failing_address_saves: HashSet<AddressId>,
}

/// Mutex-guarded in-memory store implementing both repository traits.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a customer record.
    pub fn insert_customer(&self, customer: Customer) {
        self.state().customers.insert(customer.id, customer);
    }

    /// Insert or replace an address record.
    pub fn insert_address(&self, address: Address) {
        self.state().addresses.insert(address.id, address);
    }

    /// Snapshot of a stored customer.
    #[must_use]
    pub fn customer(&self, id: CustomerId) -> Option<Customer> {
        self.state().customers.get(&id).cloned()
    }

    /// Snapshot of a stored address.
    #[must_use]
    pub fn address(&self, id: AddressId) -> Option<Address> {
        self.state().addresses.get(&id).cloned()
    }

    /// Number of stored addresses.
    #[must_use]
    pub fn address_count(&self) -> usize {
        self.state().addresses.len()
    }

    /// Make every subsequent save of this customer fail.
    pub fn fail_customer_saves(&self, id: CustomerId) {
        self.state().failing_customer_saves.insert(id);
    }

    /// Make every subsequent save of this address fail.
    pub fn fail_address_saves(&self, id: AddressId) {
        self.state().failing_address_saves.insert(id);
    }
}

impl CustomerRepository for MemoryRepository {
    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.state().customers.len() as u64)
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self
            .state()
            .customers
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if state.failing_customer_saves.contains(&customer.id) {
            return Err(RepositoryError::Database(format!(
                "injected save failure for customer {}",
                customer.id
            )));
        }
        state.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn delete(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if state.customers.remove(&customer.id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        // Owned addresses go with the customer, as a foreign key cascade would.
        state
            .addresses
            .retain(|_, address| address.customer_id != customer.id);
        Ok(())
    }
}

impl AddressRepository for MemoryRepository {
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError> {
        Ok(self
            .state()
            .addresses
            .values()
            .filter(|address| address.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn save(&self, address: &Address) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if state.failing_address_saves.contains(&address.id) {
            return Err(RepositoryError::Database(format!(
                "injected save failure for address {}",
                address.id
            )));
        }
        state.addresses.insert(address.id, address.clone());
        Ok(())
    }

    async fn delete_by_id(&self, id: AddressId) -> Result<(), RepositoryError> {
        if self.state().addresses.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn customer(id: i64) -> Customer {
        Customer {
            id: CustomerId::new(id),
            email: format!("c{id}@example.com"),
            firstname: "Ana".to_owned(),
            lastname: "Souza".to_owned(),
            tax_id: String::new(),
            default_billing: None,
            default_shipping: None,
        }
    }

    fn address(id: i64, customer_id: i64) -> Address {
        Address {
            id: AddressId::new(id),
            customer_id: CustomerId::new(customer_id),
            country_code: "BR".to_owned(),
            street: vec!["Rua A".to_owned(), "1".to_owned(), "Centro".to_owned()],
            vat_id: None,
            phone: String::new(),
            fax: String::new(),
        }
    }

    #[tokio::test]
    async fn test_list_page_is_id_ordered() {
        let repo = MemoryRepository::new();
        repo.insert_customer(customer(3));
        repo.insert_customer(customer(1));
        repo.insert_customer(customer(2));

        let page = repo.list_page(0, 2).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|c| c.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2]);

        let page = repo.list_page(2, 2).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|c| c.id.as_i64()).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn test_injected_save_failure() {
        let repo = MemoryRepository::new();
        repo.insert_address(address(1, 1));
        repo.fail_address_saves(AddressId::new(1));

        let result = AddressRepository::save(&repo, &address(1, 1)).await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_customer_cascades_addresses() {
        let repo = MemoryRepository::new();
        let c = customer(1);
        repo.insert_customer(c.clone());
        repo.insert_address(address(10, 1));
        repo.insert_address(address(11, 2));

        repo.delete(&c).await.unwrap();
        assert!(repo.customer(c.id).is_none());
        assert!(repo.address(AddressId::new(10)).is_none());
        assert!(repo.address(AddressId::new(11)).is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_address_is_not_found() {
        let repo = MemoryRepository::new();
        let result = repo.delete_by_id(AddressId::new(9)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}
