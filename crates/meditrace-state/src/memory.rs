//! In-memory world state.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::backend::{StateView, WorldState};
use crate::error::StateResult;

/// BTreeMap-backed world state for tests and demos.
///
/// Scans iterate in key order, matching the on-disk store.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateView for MemoryState {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn range_scan(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>> {
        if !start.is_empty() && !end.is_empty() && start >= end {
            return Ok(Vec::new());
        }
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start.to_string())
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.to_string())
        };
        Ok(self
            .entries
            .range((lower, upper))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

impl WorldState for MemoryState {
    fn put(&mut self, key: &str, value: &[u8]) -> StateResult<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
