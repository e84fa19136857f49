//! meditrace-core — shared domain types for the MediTrace ledger.
//!
//! Holds the records persisted to the world state, the key encoding that
//! lays them out in one flat key space, and the invocation context
//! (identity, clock, id source) every ledger call runs under.

pub mod context;
pub mod keys;
pub mod types;

pub use context::{Clock, IdSource, TxContext};
pub use types::*;
