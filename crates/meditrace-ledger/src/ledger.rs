//! Medication ledger — state transitions and queries.
//!
//! `MedicationLedger` wraps a world state and applies the medication
//! lifecycle to it: commissioning writes a unit plus its commission event,
//! custody events append to the log and move the unit, recalls flip the
//! status. Every mutation writes the full updated records; history is only
//! ever reconstructed from the event log.
//!
//! Mutations need `S: WorldState`; queries run against any `S: StateView`,
//! including the read-only snapshot of a store view.

use serde::Deserialize;
use tracing::{debug, info};

use meditrace_core::keys;
use meditrace_core::{
    MedicationStatus, MedicationUnit, TrackingEvent, TxContext, VerificationResult,
    VerificationStats,
};
use meditrace_state::{StateView, WorldState};

use crate::error::{LedgerError, LedgerResult};
use crate::index::LedgerIndex;

// ── Requests ───────────────────────────────────────────────────────

/// Input to [`MedicationLedger::commission`].
///
/// Missing JSON fields decode as empty strings and fail validation, not
/// deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommissionRequest {
    pub gtin: String,
    pub batch: String,
    pub serial_number: String,
    pub expiry_date: String,
    pub manufacturer: String,
    pub product_name: String,
    pub location: String,
}

/// Input to [`MedicationLedger::add_tracking_event`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingEventRequest {
    pub medication_id: String,
    pub event: String,
    pub location: String,
    pub actor: String,
    pub signature: String,
}

/// Input to [`MedicationLedger::issue_recall`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecallRequest {
    pub medication_id: String,
    pub reason: String,
    pub issuer: String,
}

// ── Ledger ─────────────────────────────────────────────────────────

/// The traceability ledger over a world state `S`.
///
/// With an index attached, history and by-manufacturer lookups use point
/// reads instead of full scans; observable results are identical either
/// way. Stats and search always scan.
pub struct MedicationLedger<S> {
    state: S,
    index: Option<LedgerIndex>,
}

impl<S> MedicationLedger<S> {
    /// Ledger with scan-backed queries.
    pub fn new(state: S) -> Self {
        Self { state, index: None }
    }

    /// The underlying world state.
    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<S: StateView> MedicationLedger<S> {
    /// Ledger with an index built from the current store contents.
    pub fn with_index(state: S) -> LedgerResult<Self> {
        let index = LedgerIndex::rebuild(&state)?;
        Ok(Self {
            state,
            index: Some(index),
        })
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Point lookup of a medication unit.
    ///
    /// A stored record that fails to decode is surfaced as a
    /// serialization error here, unlike in scans.
    pub fn medication(&self, id: &str) -> LedgerResult<MedicationUnit> {
        if id.is_empty() {
            return Err(LedgerError::Validation("Missing medication ID".to_string()));
        }
        let bytes = self
            .state
            .get(id)?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        decode_unit(id, &bytes)
    }

    /// Full event history for a unit, oldest first.
    ///
    /// Events are matched on their stored `medicationId` field, not the
    /// key. An empty history is a valid result, not an error.
    pub fn tracking_history(&self, medication_id: &str) -> LedgerResult<Vec<TrackingEvent>> {
        if medication_id.is_empty() {
            return Err(LedgerError::Validation("Missing medication ID".to_string()));
        }
        let mut events = match &self.index {
            Some(index) => index.events_for(&self.state, medication_id)?,
            None => self.scan_events(medication_id)?,
        };
        // Store iteration order is not part of the contract; timestamp
        // order is, with monotonic ids breaking ties.
        events.sort_by(|a, b| (a.timestamp, a.id.as_str()).cmp(&(b.timestamp, b.id.as_str())));
        Ok(events)
    }

    /// Verify a unit's authenticity and assemble its verification report.
    pub fn verify(&self, ctx: &TxContext, medication_id: &str) -> LedgerResult<VerificationResult> {
        let unit = self.medication(medication_id)?;
        let history = self.tracking_history(medication_id)?;

        let current_holder = match history.last() {
            Some(event) => event.actor.clone(),
            None => unit.manufacturer.clone(),
        };

        // A recall flips both the status and the history, so either signal
        // alone would do; checking both keeps drifted records invalid.
        let recalled = unit.status == MedicationStatus::Recalled
            || history.iter().any(|event| event.event == "recall");

        Ok(VerificationResult {
            is_valid: !recalled,
            medication_data: unit,
            tracking_history: history,
            current_holder,
            verification_time: ctx.now(),
        })
    }

    /// All units commissioned by `manufacturer`, in scan order.
    pub fn medications_by_manufacturer(
        &self,
        manufacturer: &str,
    ) -> LedgerResult<Vec<MedicationUnit>> {
        if manufacturer.is_empty() {
            return Err(LedgerError::Validation(
                "Missing manufacturer name".to_string(),
            ));
        }
        if let Some(index) = &self.index {
            return index.units_for_manufacturer(&self.state, manufacturer);
        }
        let mut units = Vec::new();
        for (key, value) in self.state.range_scan("", "")? {
            if keys::is_tracking_key(&key) {
                continue;
            }
            let Some(unit) = decode_unit_lossy(&key, &value) else {
                continue;
            };
            if unit.manufacturer == manufacturer {
                units.push(unit);
            }
        }
        Ok(units)
    }

    /// Census of medication records by status.
    pub fn verification_stats(&self) -> LedgerResult<VerificationStats> {
        let mut stats = VerificationStats::default();
        for (key, value) in self.state.range_scan("", "")? {
            if keys::is_tracking_key(&key) {
                continue;
            }
            let Some(unit) = decode_unit_lossy(&key, &value) else {
                continue;
            };
            stats.total_verifications += 1;
            match unit.status {
                MedicationStatus::Active => stats.authentic_medications += 1,
                MedicationStatus::Recalled => stats.alerts_active += 1,
            }
        }
        Ok(stats)
    }

    /// Substring search over unit descriptive fields, in scan order.
    ///
    /// Matching is case-sensitive. No matches is an empty list, not an
    /// error.
    pub fn search_medications(&self, query: &str) -> LedgerResult<Vec<MedicationUnit>> {
        if query.is_empty() {
            return Err(LedgerError::Validation("Missing search query".to_string()));
        }
        let mut matches = Vec::new();
        for (key, value) in self.state.range_scan("", "")? {
            if keys::is_tracking_key(&key) {
                continue;
            }
            let Some(unit) = decode_unit_lossy(&key, &value) else {
                continue;
            };
            if searchable_text(&unit).contains(query) {
                matches.push(unit);
            }
        }
        Ok(matches)
    }

    /// Scan every event key and keep those referencing `medication_id`.
    fn scan_events(&self, medication_id: &str) -> LedgerResult<Vec<TrackingEvent>> {
        let mut events = Vec::new();
        for (key, value) in self.state.range_scan("", "")? {
            if !keys::is_tracking_key(&key) {
                continue;
            }
            let Some(event) = decode_event_lossy(&key, &value) else {
                continue;
            };
            if event.medication_id == medication_id {
                events.push(event);
            }
        }
        Ok(events)
    }
}

impl<S: WorldState> MedicationLedger<S> {
    // ── Mutations ──────────────────────────────────────────────────

    /// Commission a new medication unit.
    ///
    /// Writes the unit record plus its commission event and returns the
    /// new unit id.
    pub fn commission(&mut self, ctx: &TxContext, req: &CommissionRequest) -> LedgerResult<String> {
        if req.gtin.is_empty()
            || req.batch.is_empty()
            || req.serial_number.is_empty()
            || req.manufacturer.is_empty()
            || req.product_name.is_empty()
        {
            return Err(LedgerError::Validation(
                "Missing required fields: gtin, batch, serialNumber, manufacturer, productName"
                    .to_string(),
            ));
        }

        let id = keys::medication_id(&req.batch, &req.serial_number);
        if self.state.get(&id)?.is_some() {
            return Err(LedgerError::AlreadyExists(id));
        }

        let now = ctx.now();
        let unit = MedicationUnit {
            id: id.clone(),
            gtin: req.gtin.clone(),
            batch: req.batch.clone(),
            serial_number: req.serial_number.clone(),
            expiry_date: req.expiry_date.clone(),
            manufacturer: req.manufacturer.clone(),
            product_name: req.product_name.clone(),
            location: req.location.clone(),
            timestamp: now,
            transaction_hash: ctx.transaction_hash(),
            status: MedicationStatus::Active,
            commission_time: now,
            recall_reason: None,
        };
        self.put_unit(&unit)?;

        let event = TrackingEvent {
            id: ctx.event_id(),
            event: "commission".to_string(),
            location: req.location.clone(),
            timestamp: now,
            actor: req.manufacturer.clone(),
            medication_id: id.clone(),
            signature: String::new(),
        };
        self.put_event(&event)?;

        info!(
            medication_id = %id,
            manufacturer = %req.manufacturer,
            product = %req.product_name,
            "medication commissioned"
        );
        Ok(id)
    }

    /// Append a custody event and move the unit to the event's location.
    ///
    /// The event tag is stored as-is; an event tagged "recall" recorded
    /// this way does not change the unit's status.
    pub fn add_tracking_event(
        &mut self,
        ctx: &TxContext,
        req: &TrackingEventRequest,
    ) -> LedgerResult<String> {
        if req.medication_id.is_empty() {
            return Err(LedgerError::Validation("Missing medication ID".to_string()));
        }
        let mut unit = self.medication(&req.medication_id)?;

        let event = TrackingEvent {
            id: ctx.event_id(),
            event: req.event.clone(),
            location: req.location.clone(),
            timestamp: ctx.now(),
            actor: req.actor.clone(),
            medication_id: req.medication_id.clone(),
            signature: req.signature.clone(),
        };
        self.put_event(&event)?;

        unit.location = req.location.clone();
        self.put_unit(&unit)?;

        info!(
            medication_id = %req.medication_id,
            event = %event.event,
            actor = %event.actor,
            location = %event.location,
            "tracking event added"
        );
        Ok(event.id)
    }

    /// Recall a unit: set recalled status and append a recall event.
    ///
    /// Recalling an already-recalled unit overwrites the reason and
    /// appends another recall event.
    pub fn issue_recall(&mut self, ctx: &TxContext, req: &RecallRequest) -> LedgerResult<String> {
        if req.medication_id.is_empty() {
            return Err(LedgerError::Validation("Missing medication ID".to_string()));
        }
        let mut unit = self.medication(&req.medication_id)?;

        unit.status = MedicationStatus::Recalled;
        unit.recall_reason = Some(req.reason.clone());
        self.put_unit(&unit)?;

        // The recall event records where the unit was when recalled.
        let event = TrackingEvent {
            id: ctx.event_id(),
            event: "recall".to_string(),
            location: unit.location.clone(),
            timestamp: ctx.now(),
            actor: req.issuer.clone(),
            medication_id: req.medication_id.clone(),
            signature: String::new(),
        };
        self.put_event(&event)?;

        info!(
            medication_id = %req.medication_id,
            issuer = %req.issuer,
            reason = %req.reason,
            "medication recall issued"
        );
        Ok(event.id)
    }

    fn put_unit(&mut self, unit: &MedicationUnit) -> LedgerResult<()> {
        let key = unit.state_key();
        let bytes = serde_json::to_vec(unit).map_err(|e| LedgerError::Serialization {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.state.put(&key, &bytes)?;
        if let Some(index) = &mut self.index {
            index.note_unit(unit);
        }
        debug!(medication_id = %unit.id, "medication record stored");
        Ok(())
    }

    fn put_event(&mut self, event: &TrackingEvent) -> LedgerResult<()> {
        let key = event.state_key();
        let bytes = serde_json::to_vec(event).map_err(|e| LedgerError::Serialization {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.state.put(&key, &bytes)?;
        if let Some(index) = &mut self.index {
            index.note_event(event);
        }
        debug!(%key, event = %event.event, "tracking event stored");
        Ok(())
    }
}

// ── Record decoding ────────────────────────────────────────────────

/// Decode a stored medication record, surfacing malformed data.
fn decode_unit(key: &str, bytes: &[u8]) -> LedgerResult<MedicationUnit> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a medication record during a scan; `None` skips the record.
pub(crate) fn decode_unit_lossy(key: &str, bytes: &[u8]) -> Option<MedicationUnit> {
    match serde_json::from_slice(bytes) {
        Ok(unit) => Some(unit),
        Err(e) => {
            debug!(%key, error = %e, "skipping unparseable medication record");
            None
        }
    }
}

/// Decode an event record during a scan; `None` skips the record.
pub(crate) fn decode_event_lossy(key: &str, bytes: &[u8]) -> Option<TrackingEvent> {
    match serde_json::from_slice(bytes) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(%key, error = %e, "skipping unparseable tracking event");
            None
        }
    }
}

/// The text a search query is matched against.
fn searchable_text(unit: &MedicationUnit) -> String {
    format!(
        "{} {} {} {} {} {}",
        unit.product_name,
        unit.manufacturer,
        unit.batch,
        unit.gtin,
        unit.serial_number,
        unit.location
    )
}
