//! Optional in-memory query index.
//!
//! Maps manufacturer → unit ids and medication id → event keys so that
//! history and by-manufacturer lookups become point reads instead of full
//! scans. The index is an internal optimization: unit ids double as store
//! keys, so iterating an ordered id set reproduces scan order and indexed
//! results are identical to the scan-backed paths. Stats and search never
//! consult it.
//!
//! The store stays the source of truth. Entries whose record has since
//! become unreadable are skipped on lookup, matching the skip tolerance
//! of scans.

use std::collections::{BTreeMap, BTreeSet};

use meditrace_core::keys;
use meditrace_core::{MedicationUnit, TrackingEvent};
use meditrace_state::StateView;

use crate::error::LedgerResult;
use crate::ledger::{decode_event_lossy, decode_unit_lossy};

/// Incremental index over the world state.
#[derive(Debug, Default)]
pub struct LedgerIndex {
    /// manufacturer → unit ids (= unit store keys), key-ordered.
    by_manufacturer: BTreeMap<String, BTreeSet<String>>,
    /// medication id → tracking-event store keys, key-ordered.
    events_by_unit: BTreeMap<String, BTreeSet<String>>,
}

impl LedgerIndex {
    /// Build the index from the current store contents with one scan.
    pub fn rebuild<S: StateView>(state: &S) -> LedgerResult<Self> {
        let mut index = Self::default();
        for (key, value) in state.range_scan("", "")? {
            if keys::is_tracking_key(&key) {
                if let Some(event) = decode_event_lossy(&key, &value) {
                    index.note_event(&event);
                }
            } else if let Some(unit) = decode_unit_lossy(&key, &value) {
                index.note_unit(&unit);
            }
        }
        Ok(index)
    }

    /// Record a written unit. Idempotent per unit id.
    pub(crate) fn note_unit(&mut self, unit: &MedicationUnit) {
        self.by_manufacturer
            .entry(unit.manufacturer.clone())
            .or_default()
            .insert(unit.id.clone());
    }

    /// Record a written event. Idempotent per event key.
    pub(crate) fn note_event(&mut self, event: &TrackingEvent) {
        self.events_by_unit
            .entry(event.medication_id.clone())
            .or_default()
            .insert(event.state_key());
    }

    /// Events for one unit via point reads, unsorted.
    pub(crate) fn events_for<S: StateView>(
        &self,
        state: &S,
        medication_id: &str,
    ) -> LedgerResult<Vec<TrackingEvent>> {
        let Some(event_keys) = self.events_by_unit.get(medication_id) else {
            return Ok(Vec::new());
        };
        let mut events = Vec::with_capacity(event_keys.len());
        for key in event_keys {
            let Some(bytes) = state.get(key)? else {
                continue;
            };
            let Some(event) = decode_event_lossy(key, &bytes) else {
                continue;
            };
            if event.medication_id == medication_id {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Units for one manufacturer via point reads, in store-key order.
    pub(crate) fn units_for_manufacturer<S: StateView>(
        &self,
        state: &S,
        manufacturer: &str,
    ) -> LedgerResult<Vec<MedicationUnit>> {
        let Some(ids) = self.by_manufacturer.get(manufacturer) else {
            return Ok(Vec::new());
        };
        let mut units = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(bytes) = state.get(id)? else {
                continue;
            };
            let Some(unit) = decode_unit_lossy(id, &bytes) else {
                continue;
            };
            if unit.manufacturer == manufacturer {
                units.push(unit);
            }
        }
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meditrace_core::MedicationStatus;
    use meditrace_state::{MemoryState, WorldState};

    fn unit(id: &str, manufacturer: &str) -> MedicationUnit {
        MedicationUnit {
            id: id.to_string(),
            gtin: "7501001234567".to_string(),
            batch: "B".to_string(),
            serial_number: "S".to_string(),
            expiry_date: "2026-01-01".to_string(),
            manufacturer: manufacturer.to_string(),
            product_name: "Product".to_string(),
            location: "Plant".to_string(),
            timestamp: 100,
            transaction_hash: "tx_1".to_string(),
            status: MedicationStatus::Active,
            commission_time: 100,
            recall_reason: None,
        }
    }

    fn event(id: &str, medication_id: &str) -> TrackingEvent {
        TrackingEvent {
            id: id.to_string(),
            event: "ship".to_string(),
            location: "DC".to_string(),
            timestamp: 200,
            actor: "Carrier".to_string(),
            medication_id: medication_id.to_string(),
            signature: String::new(),
        }
    }

    fn store(unit: &MedicationUnit, state: &mut MemoryState, index: &mut LedgerIndex) {
        state
            .put(&unit.state_key(), &serde_json::to_vec(unit).unwrap())
            .unwrap();
        index.note_unit(unit);
    }

    #[test]
    fn unknown_keys_yield_empty_results() {
        let state = MemoryState::new();
        let index = LedgerIndex::default();
        assert!(index.events_for(&state, "NOPE").unwrap().is_empty());
        assert!(index.units_for_manufacturer(&state, "Nobody").unwrap().is_empty());
    }

    #[test]
    fn rebuild_classifies_units_and_events() {
        let mut state = MemoryState::new();
        let u = unit("B1-S1", "PharmaCorp");
        state
            .put(&u.state_key(), &serde_json::to_vec(&u).unwrap())
            .unwrap();
        let e = event("evt_1", "B1-S1");
        state
            .put(&e.state_key(), &serde_json::to_vec(&e).unwrap())
            .unwrap();
        state.put("tracking_B1-S1_evt_2", b"{bad").unwrap();

        let index = LedgerIndex::rebuild(&state).unwrap();
        assert_eq!(index.events_for(&state, "B1-S1").unwrap(), vec![e]);
        assert_eq!(
            index.units_for_manufacturer(&state, "PharmaCorp").unwrap(),
            vec![u]
        );
    }

    #[test]
    fn stale_entries_are_skipped_on_lookup() {
        let mut state = MemoryState::new();
        let mut index = LedgerIndex::default();
        // Indexed but never stored.
        index.note_event(&event("evt_1", "B1-S1"));
        index.note_unit(&unit("B1-S1", "PharmaCorp"));
        // Indexed with a record that no longer parses.
        index.note_unit(&unit("B2-S2", "PharmaCorp"));
        state.put("B2-S2", b"not a unit").unwrap();

        assert!(index.events_for(&state, "B1-S1").unwrap().is_empty());
        assert!(index.units_for_manufacturer(&state, "PharmaCorp").unwrap().is_empty());
    }

    #[test]
    fn manufacturer_lookup_follows_store_key_order() {
        let mut state = MemoryState::new();
        let mut index = LedgerIndex::default();
        for id in ["B9-S1", "B1-S1", "B5-S1"] {
            store(&unit(id, "PharmaCorp"), &mut state, &mut index);
        }

        let ids: Vec<String> = index
            .units_for_manufacturer(&state, "PharmaCorp")
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, ["B1-S1", "B5-S1", "B9-S1"]);
    }

    #[test]
    fn noting_the_same_record_twice_is_idempotent() {
        let mut state = MemoryState::new();
        let mut index = LedgerIndex::default();
        let u = unit("B1-S1", "PharmaCorp");
        store(&u, &mut state, &mut index);
        store(&u, &mut state, &mut index);

        assert_eq!(
            index.units_for_manufacturer(&state, "PharmaCorp").unwrap().len(),
            1
        );
    }
}
