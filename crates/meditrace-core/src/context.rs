//! Invocation context.
//!
//! Every ledger invocation runs against a [`TxContext`] carrying the caller
//! identity, the clock, and the id source. The context is built once (from
//! gateway config, or a test fixture) and passed explicitly; there is no
//! process-global session state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Time source for record timestamps. `Fixed` pins time in tests.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(u64),
}

impl Clock {
    /// Current Unix epoch in seconds.
    pub fn epoch_secs(&self) -> u64 {
        match self {
            Clock::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            Clock::Fixed(secs) => *secs,
        }
    }
}

/// Monotonic id source.
///
/// Draws wall-clock nanoseconds clamped to be strictly increasing per
/// process, so two draws in the same nanosecond (or across a clock step
/// backwards) still differ. Ids are opaque downstream; nothing decodes
/// them back into a time.
#[derive(Debug, Default)]
pub struct IdSource {
    last: AtomicU64,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(observed) => last = observed,
            }
        }
    }

    /// Fresh transaction provenance tag.
    pub fn transaction_hash(&self) -> String {
        format!("tx_{}", self.next())
    }

    /// Fresh tracking-event id.
    pub fn event_id(&self) -> String {
        format!("evt_{}", self.next())
    }
}

/// Context for one logical caller of the ledger.
///
/// Bundles the identity metadata with the clock and id source. Cheap to
/// clone; clones share the id source, keeping ids unique process-wide.
#[derive(Debug, Clone)]
pub struct TxContext {
    /// Organization the invocations are attributed to.
    pub org: String,
    /// Ledger channel name.
    pub channel: String,
    /// Contract name invocations are addressed to.
    pub contract: String,
    pub clock: Clock,
    ids: Arc<IdSource>,
}

impl TxContext {
    pub fn new(org: &str, channel: &str, contract: &str) -> Self {
        Self {
            org: org.to_string(),
            channel: channel.to_string(),
            contract: contract.to_string(),
            clock: Clock::System,
            ids: Arc::new(IdSource::new()),
        }
    }

    /// Replace the clock (tests pin it with [`Clock::Fixed`]).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current Unix epoch in seconds, per this context's clock.
    pub fn now(&self) -> u64 {
        self.clock.epoch_secs()
    }

    /// Fresh transaction provenance tag.
    pub fn transaction_hash(&self) -> String {
        self.ids.transaction_hash()
    }

    /// Fresh tracking-event id.
    pub fn event_id(&self) -> String {
        self.ids.event_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_returns_reasonable_value() {
        let now = Clock::System.epoch_secs();
        // Should be after 2024-01-01.
        assert!(now > 1_704_067_200);
    }

    #[test]
    fn fixed_clock_is_pinned() {
        let ctx = TxContext::new("Org1", "ch", "cc").with_clock(Clock::Fixed(42));
        assert_eq!(ctx.now(), 42);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let ids = IdSource::new();
        let mut last = 0u64;
        for _ in 0..1000 {
            let id = ids.next();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn id_formats() {
        let ctx = TxContext::new("Org1", "ch", "cc");
        assert!(ctx.transaction_hash().starts_with("tx_"));
        assert!(ctx.event_id().starts_with("evt_"));
        assert_ne!(ctx.event_id(), ctx.event_id());
    }

    #[test]
    fn clones_share_the_id_source() {
        let ctx = TxContext::new("Org1", "ch", "cc");
        let other = ctx.clone();
        assert_ne!(ctx.event_id(), other.event_id());
    }
}
