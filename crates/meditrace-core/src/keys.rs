//! World-state key encoding.
//!
//! The ledger uses one flat key space: medication units are keyed by their
//! id, tracking events by `tracking_{medicationId}_{eventId}`. Scans
//! classify entries by prefix alone, so every non-event key is read as a
//! medication record.

/// Prefix marking tracking-event keys.
pub const TRACKING_PREFIX: &str = "tracking_";

/// Derive a unit id from its batch and serial number.
pub fn medication_id(batch: &str, serial_number: &str) -> String {
    format!("{batch}-{serial_number}")
}

/// Build the world-state key for a tracking event.
pub fn tracking_key(medication_id: &str, event_id: &str) -> String {
    format!("{TRACKING_PREFIX}{medication_id}_{event_id}")
}

/// True if the key names a tracking event rather than a medication unit.
///
/// A bare `tracking_` key with nothing after the prefix is not an event key.
pub fn is_tracking_key(key: &str) -> bool {
    key.len() > TRACKING_PREFIX.len() && key.starts_with(TRACKING_PREFIX)
}
