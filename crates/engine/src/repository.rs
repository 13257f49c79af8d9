//! Persistence traits the engine depends on.
//!
//! The customer database itself is an external collaborator: the engine only
//! requires paginated reads, saves, and deletes. Implementations live at the
//! edges - `PostgreSQL` in the CLI crate, [`crate::memory::MemoryRepository`]
//! in-process.

use brazilian_customer_core::{Address, AddressId, Customer, CustomerId};
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying store failed.
    #[error("database error: {0}")]
    Database(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Paginated read plus save/delete access to customer records.
///
/// `list_page` must return customers in a stable id order so that batch runs
/// are deterministic and resumable.
#[allow(async_fn_in_trait)]
pub trait CustomerRepository {
    /// Total number of customer records.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the count query fails.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Fetch one page of customers, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Customer>, RepositoryError>;

    /// Persist the customer record.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the save fails.
    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError>;

    /// Hard-delete the customer record.
    ///
    /// Callers gate this behind an explicit configuration flag; the
    /// repository performs no policy checks of its own.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the customer does not exist,
    /// [`RepositoryError::Database`] if the delete fails.
    async fn delete(&self, customer: &Customer) -> Result<(), RepositoryError>;
}

/// Access to the customer-owned address collection.
#[allow(async_fn_in_trait)]
pub trait AddressRepository {
    /// All addresses owned by the customer, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError>;

    /// Persist the address record.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the save fails.
    async fn save(&self, address: &Address) -> Result<(), RepositoryError>;

    /// Delete an address by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the address does not exist,
    /// [`RepositoryError::Database`] if the delete fails.
    async fn delete_by_id(&self, id: AddressId) -> Result<(), RepositoryError>;
}
