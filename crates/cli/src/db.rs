//! `PostgreSQL`-backed repositories for the customer database.
//!
//! # Expected schema
//!
//! The hygiene tool targets an existing store; it owns no migrations. The
//! queries below expect:
//!
//! ```text
//! customer
//!   id               BIGINT PRIMARY KEY
//!   email            TEXT
//!   firstname        TEXT
//!   lastname         TEXT
//!   tax_id           TEXT            -- raw CPF/CNPJ as collected
//!   default_billing  BIGINT NULL     -- references customer_address(id)
//!   default_shipping BIGINT NULL     -- references customer_address(id)
//!
//! customer_address
//!   id           BIGINT PRIMARY KEY
//!   customer_id  BIGINT NOT NULL     -- references customer(id)
//!   country_code TEXT
//!   street       TEXT[]              -- ordered street lines
//!   vat_id       TEXT NULL           -- formatted CPF/CNPJ, written by this tool
//!   telephone    TEXT
//!   fax          TEXT
//! ```
//!
//! Queries are bound at runtime (no compile-time database requirement) and
//! mapped by hand; NULL text columns read as empty strings, matching how the
//! engine treats missing data.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};

use brazilian_customer_core::{Address, AddressId, Customer, CustomerId};
use brazilian_customer_engine::{AddressRepository, CustomerRepository, RepositoryError};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

fn db_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(err.to_string())
}

fn customer_from_row(row: &PgRow) -> Result<Customer, RepositoryError> {
    Ok(Customer {
        id: row.try_get("id").map_err(db_err)?,
        email: row
            .try_get::<Option<String>, _>("email")
            .map_err(db_err)?
            .unwrap_or_default(),
        firstname: row
            .try_get::<Option<String>, _>("firstname")
            .map_err(db_err)?
            .unwrap_or_default(),
        lastname: row
            .try_get::<Option<String>, _>("lastname")
            .map_err(db_err)?
            .unwrap_or_default(),
        tax_id: row
            .try_get::<Option<String>, _>("tax_id")
            .map_err(db_err)?
            .unwrap_or_default(),
        default_billing: row.try_get("default_billing").map_err(db_err)?,
        default_shipping: row.try_get("default_shipping").map_err(db_err)?,
    })
}

fn address_from_row(row: &PgRow) -> Result<Address, RepositoryError> {
    Ok(Address {
        id: row.try_get("id").map_err(db_err)?,
        customer_id: row.try_get("customer_id").map_err(db_err)?,
        country_code: row
            .try_get::<Option<String>, _>("country_code")
            .map_err(db_err)?
            .unwrap_or_default(),
        street: row
            .try_get::<Option<Vec<String>>, _>("street")
            .map_err(db_err)?
            .unwrap_or_default(),
        vat_id: row.try_get("vat_id").map_err(db_err)?,
        phone: row
            .try_get::<Option<String>, _>("telephone")
            .map_err(db_err)?
            .unwrap_or_default(),
        fax: row
            .try_get::<Option<String>, _>("fax")
            .map_err(db_err)?
            .unwrap_or_default(),
    })
}

/// Repository over the `customer` table.
pub struct PgCustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PgCustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl CustomerRepository for PgCustomerRepository<'_> {
    async fn count(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM customer")
            .fetch_one(self.pool)
            .await
            .map_err(db_err)?;
        let total: i64 = row.try_get("total").map_err(db_err)?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, email, firstname, lastname, tax_id, default_billing, default_shipping \
             FROM customer ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(customer_from_row).collect()
    }

    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE customer \
             SET email = $2, firstname = $3, lastname = $4, tax_id = $5, \
                 default_billing = $6, default_shipping = $7 \
             WHERE id = $1",
        )
        .bind(customer.id)
        .bind(&customer.email)
        .bind(&customer.firstname)
        .bind(&customer.lastname)
        .bind(&customer.tax_id)
        .bind(customer.default_billing)
        .bind(customer.default_shipping)
        .execute(self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM customer WHERE id = $1")
            .bind(customer.id)
            .execute(self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Repository over the `customer_address` table.
pub struct PgAddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PgAddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl AddressRepository for PgAddressRepository<'_> {
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, customer_id, country_code, street, vat_id, telephone, fax \
             FROM customer_address WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(address_from_row).collect()
    }

    async fn save(&self, address: &Address) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE customer_address \
             SET country_code = $2, street = $3, vat_id = $4, telephone = $5, fax = $6 \
             WHERE id = $1",
        )
        .bind(address.id)
        .bind(&address.country_code)
        .bind(&address.street)
        .bind(address.vat_id.as_deref())
        .bind(&address.phone)
        .bind(&address.fax)
        .execute(self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_by_id(&self, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM customer_address WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
