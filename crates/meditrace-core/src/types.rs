//! Domain types for the MediTrace ledger.
//!
//! These types are JSON-serialized both into the world state and across the
//! gateway. Field names are pinned to the established wire format
//! (camelCase), so existing records and downstream verifier clients keep
//! working.

use serde::{Deserialize, Serialize};

use crate::keys;

// ── Medication ─────────────────────────────────────────────────────

/// Lifecycle status of a medication unit.
///
/// The only transition is `Active` → `Recalled`, via a recall; nothing
/// moves a unit back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedicationStatus {
    Active,
    Recalled,
}

/// One commissioned medication unit — a batch + serial number combination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationUnit {
    /// Primary key: `{batch}-{serialNumber}`.
    pub id: String,
    /// Global Trade Item Number of the product.
    pub gtin: String,
    pub batch: String,
    pub serial_number: String,
    pub expiry_date: String,
    pub manufacturer: String,
    pub product_name: String,
    /// Last reported location; mirrors the most recent tracking event.
    /// Full movement history lives in the event log.
    pub location: String,
    /// Unix timestamp (seconds) when the record was created.
    pub timestamp: u64,
    /// Provenance tag of the commissioning transaction, never reused.
    pub transaction_hash: String,
    pub status: MedicationStatus,
    /// Unix timestamp (seconds) when the unit was commissioned.
    pub commission_time: u64,
    /// Present only once the unit has been recalled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recall_reason: Option<String>,
}

impl MedicationUnit {
    /// World-state key for this unit (its id).
    pub fn state_key(&self) -> String {
        self.id.clone()
    }
}

// ── Tracking events ────────────────────────────────────────────────

/// One immutable custody or lifecycle event for a medication unit.
///
/// Events are append-only: once written they are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    /// Unique event id, `evt_{n}`.
    pub id: String,
    /// Event tag. Recognized values: commission, ship, receive, dispense,
    /// recall. Other tags are stored as-is and not interpreted.
    pub event: String,
    pub location: String,
    /// Unix timestamp (seconds) when the event was recorded.
    pub timestamp: u64,
    /// Party that performed the event.
    pub actor: String,
    /// Id of the medication unit this event belongs to.
    pub medication_id: String,
    /// Opaque attestation supplied by the actor; stored, not verified.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
}

impl TrackingEvent {
    /// World-state key for this event: `tracking_{medicationId}_{eventId}`.
    pub fn state_key(&self) -> String {
        keys::tracking_key(&self.medication_id, &self.id)
    }
}

// ── Verification ───────────────────────────────────────────────────

/// Outcome of an authenticity verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    pub medication_data: MedicationUnit,
    /// Full event history, oldest first.
    pub tracking_history: Vec<TrackingEvent>,
    /// Actor of the latest event, or the manufacturer when no events exist.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_holder: String,
    /// Unix timestamp (seconds) when the verification ran.
    pub verification_time: u64,
}

/// Census of medication records by status.
///
/// Field names are historical: `totalVerifications` counts medication
/// records in the store, not verification calls.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStats {
    pub total_verifications: u64,
    pub authentic_medications: u64,
    pub alerts_active: u64,
}
