//! Error types for tablekit

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Failure reported by a [`Gateway`](crate::Gateway) while executing one statement.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Error returned by the PostgreSQL client or server
    #[error("{0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// The statement did not finish within the session's query timeout
    #[error("statement timed out after {0:?}")]
    Timeout(Duration),

    /// A result cell could not be converted to text
    #[error("decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The gateway rejected the statement with a plain message
    #[error("{0}")]
    Rejected(String),
}

impl GatewayError {
    /// Create a plain rejection, used by gateways that are not backed by PostgreSQL.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// SQLSTATE code when the server reported one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Postgres(err) => err.as_db_error().map(|db| db.code().code()),
            _ => None,
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Which half of a foreign-key-check toggle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksPhase {
    Disable,
    Enable,
}

impl fmt::Display for ChecksPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksPhase::Disable => f.write_str("disable"),
            ChecksPhase::Enable => f.write_str("re-enable"),
        }
    }
}

/// Error types for table operations
#[derive(Debug, Error)]
pub enum TableError {
    /// Session could not be opened
    #[error("Connection error: {0}")]
    Connect(String),

    /// CREATE / ALTER / DROP rejected
    #[error("Schema error on '{table}': {source}")]
    Schema {
        table: String,
        source: GatewayError,
    },

    /// INSERT rejected; `row` rows of the same call were already committed
    #[error("Insert error on '{table}' at row {row}: {source}")]
    Insert {
        table: String,
        row: usize,
        source: GatewayError,
    },

    /// UPDATE rejected
    #[error("Update error on '{table}': {source}")]
    Update {
        table: String,
        source: GatewayError,
    },

    /// DELETE rejected
    #[error("Delete error on '{table}': {source}")]
    Delete {
        table: String,
        source: GatewayError,
    },

    /// SELECT rejected or its result could not be materialized
    #[error("Query error on '{table}': {source}")]
    Query {
        table: String,
        source: GatewayError,
    },

    /// A foreign-key-check toggle statement failed
    #[error("Failed to {phase} foreign key checks: {source}")]
    ForeignKeyChecks {
        phase: ChecksPhase,
        source: GatewayError,
    },

    /// The guarded operation failed and re-enabling foreign key checks failed too
    #[error("{cause} (re-enabling foreign key checks also failed: {restore})")]
    ChecksNotRestored {
        #[source]
        cause: Box<TableError>,
        restore: GatewayError,
    },

    /// A bulk operation stopped at `entry` after `succeeded` earlier entries were applied
    #[error("Bulk operation stopped at '{entry}' after {succeeded} succeeded: {source}")]
    Bulk {
        entry: String,
        succeeded: usize,
        source: Box<TableError>,
    },

    /// Input rejected before any statement was sent
    #[error("Validation error: {0}")]
    Validation(String),
}

impl TableError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The gateway error underneath this error, following bulk and restore wrappers.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::Schema { source, .. }
            | Self::Insert { source, .. }
            | Self::Update { source, .. }
            | Self::Delete { source, .. }
            | Self::Query { source, .. }
            | Self::ForeignKeyChecks { source, .. } => Some(source),
            Self::ChecksNotRestored { cause, .. } => cause.gateway_error(),
            Self::Bulk { source, .. } => source.gateway_error(),
            Self::Connect(_) | Self::Validation(_) => None,
        }
    }

    /// Number of entries (rows or tables) applied before the failure, when tracked.
    pub fn succeeded(&self) -> Option<usize> {
        match self {
            Self::Insert { row, .. } => Some(*row),
            Self::Bulk { succeeded, .. } => Some(*succeeded),
            Self::ChecksNotRestored { cause, .. } => cause.succeeded(),
            _ => None,
        }
    }
}
