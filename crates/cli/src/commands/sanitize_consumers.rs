//! Customer sanitation pass.
//!
//! Normalizes names and emails across the whole customer table. With
//! `--delete=1`, customers whose sanitized record still cannot be saved are
//! hard-deleted.
//!
//! # Usage
//!
//! ```bash
//! brc-cli sanitize-consumers
//! brc-cli sanitize-consumers --delete=1 --batch-size=50
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the customer database

use std::path::Path;

use secrecy::SecretString;
use tracing::{info, warn};

use brazilian_customer_core::SanitizeOutcome;
use brazilian_customer_engine::{AuditLog, CustomerRepository, SanitizeConsumer, SanitizeOptions};

use super::CommandError;
use crate::db::{self, PgCustomerRepository};

/// Run the sanitize-consumers pass over the full customer set.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the connection fails, or a
/// page-level fetch fails.
pub async fn run(delete: bool, batch_size: u64, output_dir: &Path) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = std::env::var("DATABASE_URL")
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?
        .into();

    info!("Connecting to customer database...");
    let pool = db::create_pool(&database_url).await?;

    let customers = PgCustomerRepository::new(&pool);
    let audit = AuditLog::new(output_dir);
    let options = SanitizeOptions {
        delete_unsavable: delete,
    };
    let pass = SanitizeConsumer::new(&customers, &audit, options);

    if delete {
        warn!("Hard delete enabled: unsavable customers will be removed");
    }

    let total = customers.count().await?;
    info!("Starting the customer sanitation pass over {total} customers...");

    let mut offset = 0_u64;
    let mut processed = 0_u64;
    let mut saved = 0_u64;
    let mut save_failed = 0_u64;
    let mut deleted = 0_u64;

    loop {
        let page = customers.list_page(offset, batch_size).await?;
        if page.is_empty() {
            break;
        }
        let fetched = page.len() as u64;
        let mut deleted_this_page = 0_u64;

        for mut customer in page {
            match pass.process_customer(&mut customer).await {
                SanitizeOutcome::Saved => saved += 1,
                SanitizeOutcome::SaveFailed => save_failed += 1,
                SanitizeOutcome::Deleted => {
                    deleted += 1;
                    deleted_this_page += 1;
                }
            }
            processed += 1;
        }

        // Deleted rows shift the remaining set left; advancing the offset by
        // the full page size would skip that many records.
        offset += fetched - deleted_this_page;

        info!("Processed {processed}/{total} customers");
    }

    info!("Customer sanitation pass complete!");
    info!("  Saved: {saved}, save failures kept: {save_failed}, deleted: {deleted}");
    info!("  Audit streams: {}", audit.dir().display());

    Ok(())
}
