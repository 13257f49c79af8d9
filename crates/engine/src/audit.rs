//! Append-only dual-stream CSV audit log.
//!
//! Every reconciliation outcome is recorded in one of two files under the
//! configured output directory:
//!
//! - `customer-changes.csv` - successful changes (`Customer Id,Email,VAT ID,Phone`)
//! - `customer-errors.csv` - failures (`Customer Id,Email,Obs`)
//!
//! Rows are comma-joined with **no quoting or escaping**: an email or error
//! message containing a comma shifts that row's columns. Downstream tooling
//! depends on this exact format, so it is preserved rather than fixed.
//!
//! Each append takes an OS-level exclusive lock on the target file spanning
//! the header check and the row write, so concurrent process instances never
//! interleave partial lines. Write failures are swallowed: the append reports
//! `false`, logs at `warn`, and the batch keeps going.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use brazilian_customer_core::CustomerId;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One audit row, tagged by outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuditRecord {
    /// An address was fixed, saved, and promoted.
    Success {
        /// Owning customer.
        customer_id: CustomerId,
        /// Customer email at processing time.
        email: String,
        /// Formatted CPF/CNPJ written to the address.
        vat_id: String,
        /// Formatted telephone written to the address.
        phone: String,
    },
    /// A record was purged or a persistence call failed.
    Failure {
        /// Owning customer.
        customer_id: CustomerId,
        /// Customer email at processing time.
        email: String,
        /// Human-readable reason, also shown in the `Obs` column.
        reason: String,
    },
}

impl AuditRecord {
    /// Header row of the success stream.
    pub const SUCCESS_HEADER: &'static str = "Customer Id,Email,VAT ID,Phone";
    /// Header row of the failure stream.
    pub const FAILURE_HEADER: &'static str = "Customer Id,Email,Obs";

    /// File name of the stream this record belongs to.
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Success { .. } => "customer-changes.csv",
            Self::Failure { .. } => "customer-errors.csv",
        }
    }

    const fn header(&self) -> &'static str {
        match self {
            Self::Success { .. } => Self::SUCCESS_HEADER,
            Self::Failure { .. } => Self::FAILURE_HEADER,
        }
    }

    /// Render the comma-joined data row (no quoting).
    #[must_use]
    pub fn line(&self) -> String {
        match self {
            Self::Success {
                customer_id,
                email,
                vat_id,
                phone,
            } => format!("{customer_id},{email},{vat_id},{phone}"),
            Self::Failure {
                customer_id,
                email,
                reason,
            } => format!("{customer_id},{email},{reason}"),
        }
    }
}

/// Append-only CSV sink with one physical file per outcome tag.
///
/// Files and the output directory are created lazily on first append; the
/// header is written exactly once per file lifetime.
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    /// Create a log rooted at `dir`. Nothing is touched on disk until the
    /// first append.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the streams are written to.
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Append one record to its stream.
    ///
    /// Returns `true` when the row hit the disk. I/O failures are logged at
    /// `warn` and reported as `false`; callers must tolerate a lost audit row
    /// without aborting the batch.
    pub fn append(&self, record: &AuditRecord) -> bool {
        match self.try_append(record) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    file = record.file_name(),
                    error = %err,
                    "Failed to append audit record"
                );
                false
            }
        }
    }

    fn try_append(&self, record: &AuditRecord) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(record.file_name());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // The lock must span the header check and the row write; it is
        // released when `file` drops at the end of this scope.
        file.lock()?;

        if file.metadata()?.len() == 0 {
            file.write_all(record.header().as_bytes())?;
            file.write_all(b"\n")?;
        }

        file.write_all(record.line().as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn success(id: i64) -> AuditRecord {
        AuditRecord::Success {
            customer_id: CustomerId::new(id),
            email: format!("c{id}@example.com"),
            vat_id: "111.444.777-35".to_owned(),
            phone: "(11)98765-4321".to_owned(),
        }
    }

    fn failure(id: i64, reason: &str) -> AuditRecord {
        AuditRecord::Failure {
            customer_id: CustomerId::new(id),
            email: format!("c{id}@example.com"),
            reason: reason.to_owned(),
        }
    }

    #[test]
    fn test_header_written_once_then_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        assert!(log.append(&success(1)));
        assert!(log.append(&success(2)));

        let contents = std::fs::read_to_string(dir.path().join("customer-changes.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Customer Id,Email,VAT ID,Phone",
                "1,c1@example.com,111.444.777-35,(11)98765-4321",
                "2,c2@example.com,111.444.777-35,(11)98765-4321",
            ]
        );
    }

    #[test]
    fn test_streams_are_independent_files() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        log.append(&success(1));
        log.append(&failure(2, "CPF/CNPJ invalid: 123"));

        let errors = std::fs::read_to_string(dir.path().join("customer-errors.csv")).unwrap();
        assert_eq!(
            errors.lines().collect::<Vec<_>>(),
            vec![
                "Customer Id,Email,Obs",
                "2,c2@example.com,CPF/CNPJ invalid: 123",
            ]
        );
        assert!(dir.path().join("customer-changes.csv").exists());
    }

    #[test]
    fn test_header_not_repeated_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        AuditLog::new(dir.path()).append(&failure(1, "a"));
        AuditLog::new(dir.path()).append(&failure(2, "b"));

        let contents = std::fs::read_to_string(dir.path().join("customer-errors.csv")).unwrap();
        let headers = contents
            .lines()
            .filter(|l| *l == AuditRecord::FAILURE_HEADER)
            .count();
        assert_eq!(headers, 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_embedded_commas_are_not_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        log.append(&failure(7, "Street Address invalid: Rua A,100"));

        let contents = std::fs::read_to_string(dir.path().join("customer-errors.csv")).unwrap();
        // The reason's comma lands in the file verbatim; no quotes appear.
        assert!(contents.contains("7,c7@example.com,Street Address invalid: Rua A,100"));
        assert!(!contents.contains('"'));
    }

    #[test]
    fn test_append_to_unwritable_dir_reports_false() {
        let log = AuditLog::new("/proc/no-such-dir/audit");
        assert!(!log.append(&failure(1, "x")));
    }
}
