//! meditrace-ledger — the MediTrace traceability core.
//!
//! Deterministic state-transition and query logic over a flat key-value
//! world state: commissioning, custody tracking, recalls, and the
//! derivations behind verification, statistics, and search. One invocation
//! reads prior state, validates a transition, and writes the new records;
//! atomicity and write serialization belong to the store underneath.
//!
//! [`dispatch`] maps the chaincode-style `(function, positional args)`
//! invocation surface onto [`MedicationLedger`] methods. [`LedgerIndex`]
//! is an optional in-memory accelerator for the scan-backed lookups.

pub mod dispatch;
pub mod error;
pub mod index;
pub mod ledger;

pub use error::{LedgerError, LedgerResult};
pub use index::LedgerIndex;
pub use ledger::{CommissionRequest, MedicationLedger, RecallRequest, TrackingEventRequest};
