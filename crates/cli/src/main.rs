//! Brazilian Customer CLI - Batch hygiene passes for the customer database.
//!
//! # Usage
//!
//! ```bash
//! # Validate, format, and reconcile Brazilian customer addresses
//! brc-cli format-addresses
//!
//! # Same, with a smaller page size and custom audit directory
//! brc-cli format-addresses --batch-size=50 --output-dir=/tmp/audit
//!
//! # Sanitize customer names and emails
//! brc-cli sanitize-consumers
//!
//! # Sanitize and hard-delete records that still cannot be saved
//! brc-cli sanitize-consumers --delete=1
//! ```
//!
//! # Commands
//!
//! - `format-addresses` - CPF/CNPJ validation, phone formatting, default-address promotion
//! - `sanitize-consumers` - Name/email normalization with optional hard delete
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the customer database

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};

mod commands;
mod db;

/// Default directory for the audit CSV streams.
const DEFAULT_OUTPUT_DIR: &str = "var/export/customer-hygiene";

#[derive(Parser)]
#[command(name = "brc-cli")]
#[command(author, version, about = "Brazilian customer hygiene tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and format Brazilian address data
    FormatAddresses {
        /// Customers fetched per page
        #[arg(long, default_value_t = 100)]
        batch_size: u64,

        /// Directory for the audit CSV streams
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
    /// Sanitize customer names and emails
    SanitizeConsumers {
        /// Hard-delete customers whose record cannot be saved (0|1)
        #[arg(long, default_value = "0", value_parser = BoolishValueParser::new())]
        delete: bool,

        /// Customers fetched per page
        #[arg(long, default_value_t = 100)]
        batch_size: u64,

        /// Directory for the audit CSV streams
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::FormatAddresses {
            batch_size,
            output_dir,
        } => {
            commands::format_addresses::run(batch_size, &output_dir).await?;
        }
        Commands::SanitizeConsumers {
            delete,
            batch_size,
            output_dir,
        } => {
            commands::sanitize_consumers::run(delete, batch_size, &output_dir).await?;
        }
    }
    Ok(())
}
