//! CLI command implementations.

use brazilian_customer_engine::RepositoryError;
use thiserror::Error;

pub mod format_addresses;
pub mod sanitize_consumers;

/// Errors that can abort a whole batch command.
///
/// Per-record failures never surface here; they are logged and the batch
/// keeps going. Only setup problems and page-level fetch failures abort.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    /// Repository error outside a per-record scope (count or page fetch).
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
