//! Address formatting pass.
//!
//! Walks the whole customer table in id-ordered pages and reconciles each
//! customer: CPF/CNPJ validation, street checks, phone formatting, and
//! default-address promotion. Outcomes land in the audit CSV streams under
//! the output directory.
//!
//! # Usage
//!
//! ```bash
//! brc-cli format-addresses --batch-size=100
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the customer database

use std::path::Path;

use secrecy::SecretString;
use tracing::{error, info};

use brazilian_customer_engine::{AuditLog, CustomerReconciler, CustomerRepository};

use super::CommandError;
use crate::db::{self, PgAddressRepository, PgCustomerRepository};

/// Run the format-addresses pass over the full customer set.
///
/// One customer is fully reconciled before the next begins; a processed page
/// is dropped before the next page is fetched. Per-customer repository errors
/// are logged and skipped.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the connection fails, or a
/// page-level fetch fails.
pub async fn run(batch_size: u64, output_dir: &Path) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = std::env::var("DATABASE_URL")
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?
        .into();

    info!("Connecting to customer database...");
    let pool = db::create_pool(&database_url).await?;

    let customers = PgCustomerRepository::new(&pool);
    let addresses = PgAddressRepository::new(&pool);
    let audit = AuditLog::new(output_dir);
    let reconciler = CustomerReconciler::new(&customers, &addresses, &audit);

    let total = customers.count().await?;
    info!("Starting the address formatting pass over {total} customers...");

    let mut offset = 0_u64;
    let mut processed = 0_u64;
    let mut committed = 0_usize;
    let mut purged = 0_usize;
    let mut defaults_assigned = 0_u64;
    let mut failed = 0_u64;

    loop {
        let page = customers.list_page(offset, batch_size).await?;
        if page.is_empty() {
            break;
        }
        offset += page.len() as u64;

        for mut customer in page {
            match reconciler.process_customer(&mut customer).await {
                Ok(summary) => {
                    committed += summary.committed;
                    purged += summary.purged;
                    if summary.default_assigned {
                        defaults_assigned += 1;
                    }
                }
                Err(err) => {
                    failed += 1;
                    error!(
                        customer_id = %customer.id,
                        error = %err,
                        "Customer pass failed, continuing with the batch"
                    );
                }
            }
            processed += 1;
        }

        info!("Processed {processed}/{total} customers");
    }

    info!("Address formatting pass complete!");
    info!(
        "  Addresses committed: {committed}, purged: {purged}, defaults assigned: {defaults_assigned}"
    );
    if failed > 0 {
        info!("  Customers skipped on repository errors: {failed}");
    }
    info!("  Audit streams: {}", audit.dir().display());

    Ok(())
}
