//! Error types for ingestion
//!
//! Row and source failures are absorbed by the pipeline and counted; only
//! errors for which [`IngestError::is_fatal`] returns `true` escape a run.

use vitibrasil_common::Domain;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Neither the local cache nor the remote source produced a table
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// One row could not be turned into a record
    #[error("Malformed row (year {year}, entity '{entity}'): {reason}")]
    MalformedRow {
        year: String,
        entity: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Reingestion is disabled for domain '{0}' (set ALLOW_REINGEST=true)")]
    ReingestDisabled(Domain),
}

impl IngestError {
    pub fn source_unavailable(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        IngestError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed_row(
        year: impl Into<String>,
        entity: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        IngestError::MalformedRow {
            year: year.into(),
            entity: entity.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the store can no longer accept writes.
    ///
    /// Constraint violations and decode failures stay scoped to one row.
    pub fn is_fatal(&self) -> bool {
        match self {
            IngestError::Storage(sqlx::Error::Database(db)) => db
                .code()
                .map(|code| is_fatal_sqlite_code(&code))
                .unwrap_or(false),
            IngestError::Storage(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::Configuration(_)
                    | sqlx::Error::Protocol(_)
                    | sqlx::Error::WorkerCrashed
            ),
            IngestError::Migration(_) => true,
            _ => false,
        }
    }
}

/// SQLite result codes after which no later write can succeed: busy,
/// locked, read-only, I/O error, corrupt, full and cannot-open.
///
/// sqlx reports extended codes; the primary code is the low byte.
fn is_fatal_sqlite_code(code: &str) -> bool {
    match code.parse::<i64>() {
        Ok(extended) => matches!(extended & 0xff, 5 | 6 | 8 | 10 | 11 | 13 | 14),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_scoped_errors_are_not_fatal() {
        assert!(!IngestError::malformed_row("2020", "Tinto", "bad number").is_fatal());
        assert!(!IngestError::source_unavailable("download/Producao.csv", "404").is_fatal());
        assert!(!IngestError::Storage(sqlx::Error::RowNotFound).is_fatal());
    }

    #[test]
    fn test_pool_failures_are_fatal() {
        assert!(IngestError::Storage(sqlx::Error::PoolClosed).is_fatal());
        assert!(IngestError::Storage(sqlx::Error::PoolTimedOut).is_fatal());
    }

    #[test]
    fn test_unwritable_database_codes_are_fatal() {
        // full, read-only, busy, locked
        assert!(is_fatal_sqlite_code("13"));
        assert!(is_fatal_sqlite_code("8"));
        assert!(is_fatal_sqlite_code("5"));
        assert!(is_fatal_sqlite_code("6"));
        // SQLITE_READONLY_DBMOVED, SQLITE_IOERR_WRITE
        assert!(is_fatal_sqlite_code("1032"));
        assert!(is_fatal_sqlite_code("778"));

        // unique and check constraint violations belong to one row
        assert!(!is_fatal_sqlite_code("2067"));
        assert!(!is_fatal_sqlite_code("275"));
        assert!(!is_fatal_sqlite_code("19"));
        assert!(!is_fatal_sqlite_code("not-a-code"));
    }

    #[test]
    fn test_display_includes_context() {
        let err = IngestError::malformed_row("2020", "Tinto", "invalid float literal");
        let message = err.to_string();
        assert!(message.contains("2020"));
        assert!(message.contains("Tinto"));

        let err = IngestError::ReingestDisabled(Domain::Exportation);
        assert!(err.to_string().contains("exportation"));
    }
}
