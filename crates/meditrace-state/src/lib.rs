//! meditrace-state — world-state storage for MediTrace.
//!
//! The ledger logic is written against two small traits: [`StateView`]
//! (point get + ordered range scan) and [`WorldState`] (adds put). Two
//! implementations ship here:
//!
//! - [`MemoryState`] — BTreeMap-backed, single-owner, for tests and demos.
//! - [`StateStore`] — redb-backed, persistent or in-memory, exposing
//!   snapshot reads and atomic per-invocation write transactions through
//!   `with_view` / `with_txn`.
//!
//! Values are opaque bytes; record encoding is the caller's concern.

pub mod backend;
pub mod error;
pub mod memory;
pub mod store;

pub use backend::{StateView, WorldState};
pub use error::{StateError, StateResult};
pub use memory::MemoryState;
pub use store::{StateStore, TxnState, ViewState};
