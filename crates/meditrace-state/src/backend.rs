//! World-state access traits.
//!
//! [`StateView`] is the read half (point get + ordered range scan);
//! [`WorldState`] adds writes. The split mirrors the read/write transaction
//! split of the backing store: query paths take any `StateView`, mutation
//! paths need a full `WorldState`.

use crate::error::StateResult;

/// Read access to the world state.
pub trait StateView {
    /// Point lookup. `None` when the key is absent.
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    /// Key-ordered scan over `[start, end)`. An empty bound means unbounded
    /// on that side, so `range_scan("", "")` walks the whole key space.
    fn range_scan(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>>;
}

/// Read-write access to the world state.
pub trait WorldState: StateView {
    /// Insert or overwrite the value under `key`.
    fn put(&mut self, key: &str, value: &[u8]) -> StateResult<()>;
}

impl<T: StateView + ?Sized> StateView for &T {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn range_scan(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>> {
        (**self).range_scan(start, end)
    }
}

impl<T: StateView + ?Sized> StateView for &mut T {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn range_scan(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>> {
        (**self).range_scan(start, end)
    }
}

impl<T: WorldState + ?Sized> WorldState for &mut T {
    fn put(&mut self, key: &str, value: &[u8]) -> StateResult<()> {
        (**self).put(key, value)
    }
}
