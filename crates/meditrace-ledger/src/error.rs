//! Ledger error taxonomy.
//!
//! Every operation produces exactly one error or one success payload; a
//! failed invocation writes nothing. Message texts for the caller-facing
//! variants follow the established chaincode responses, so callers keep
//! matching on the error kind rather than the text.

use thiserror::Error;

use meditrace_state::StateError;

/// Result type alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors produced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input rejected before any state is touched.
    #[error("{0}")]
    Validation(String),

    /// The referenced medication does not exist.
    #[error("Medication not found: {0}")]
    NotFound(String),

    /// Commissioning an id that is already present.
    #[error("Medication already exists with ID: {0}")]
    AlreadyExists(String),

    /// Record encoding or decoding failed. Point lookups surface this;
    /// scans skip the offending record instead.
    #[error("serialization failure for {key}: {reason}")]
    Serialization { key: String, reason: String },

    /// Store failure, always propagated.
    #[error("state store error: {0}")]
    Store(#[from] StateError),
}
