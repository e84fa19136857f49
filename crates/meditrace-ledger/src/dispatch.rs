//! Chaincode-style invocation dispatch.
//!
//! The invocation surface is a function name plus positional string
//! arguments; payloads come back as bytes — raw ids for mutations, JSON
//! for queries. [`execute`] accepts all nine functions and needs write
//! access; [`query`] accepts only the six read functions and runs against
//! any read snapshot. Wrong argument counts and unknown function names are
//! validation errors.

use serde::Serialize;

use meditrace_core::TxContext;
use meditrace_state::{StateView, WorldState};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{CommissionRequest, MedicationLedger, RecallRequest, TrackingEventRequest};

/// Dispatch a full invocation (mutations and queries).
pub fn execute<S: WorldState>(
    ledger: &mut MedicationLedger<S>,
    ctx: &TxContext,
    function: &str,
    args: &[&str],
) -> LedgerResult<Vec<u8>> {
    match function {
        "commissionMedication" => {
            let [gtin, batch, serial_number, expiry_date, manufacturer, product_name, location] =
                expect_args(function, args)?;
            let req = CommissionRequest {
                gtin: gtin.to_string(),
                batch: batch.to_string(),
                serial_number: serial_number.to_string(),
                expiry_date: expiry_date.to_string(),
                manufacturer: manufacturer.to_string(),
                product_name: product_name.to_string(),
                location: location.to_string(),
            };
            ledger.commission(ctx, &req).map(String::into_bytes)
        }
        "addTrackingEvent" => {
            let [medication_id, event, location, actor, signature] = expect_args(function, args)?;
            let req = TrackingEventRequest {
                medication_id: medication_id.to_string(),
                event: event.to_string(),
                location: location.to_string(),
                actor: actor.to_string(),
                signature: signature.to_string(),
            };
            ledger.add_tracking_event(ctx, &req).map(String::into_bytes)
        }
        "issueMedicationRecall" => {
            let [medication_id, reason, issuer] = expect_args(function, args)?;
            let req = RecallRequest {
                medication_id: medication_id.to_string(),
                reason: reason.to_string(),
                issuer: issuer.to_string(),
            };
            ledger.issue_recall(ctx, &req).map(String::into_bytes)
        }
        _ => query(ledger, ctx, function, args),
    }
}

/// Dispatch a read-only invocation. Mutating functions are rejected.
pub fn query<S: StateView>(
    ledger: &MedicationLedger<S>,
    ctx: &TxContext,
    function: &str,
    args: &[&str],
) -> LedgerResult<Vec<u8>> {
    match function {
        "getMedication" => {
            let [id] = expect_args(function, args)?;
            to_json(function, &ledger.medication(id)?)
        }
        "getTrackingHistory" => {
            let [id] = expect_args(function, args)?;
            to_json(function, &ledger.tracking_history(id)?)
        }
        "verifyMedication" => {
            let [id] = expect_args(function, args)?;
            to_json(function, &ledger.verify(ctx, id)?)
        }
        "getMedicationsByManufacturer" => {
            let [manufacturer] = expect_args(function, args)?;
            to_json(function, &ledger.medications_by_manufacturer(manufacturer)?)
        }
        "getVerificationStats" => {
            let [] = expect_args(function, args)?;
            to_json(function, &ledger.verification_stats()?)
        }
        "searchMedications" => {
            let [q] = expect_args(function, args)?;
            to_json(function, &ledger.search_medications(q)?)
        }
        "commissionMedication" | "addTrackingEvent" | "issueMedicationRecall" => {
            Err(LedgerError::Validation(format!(
                "Function {function} mutates state and requires a write invocation"
            )))
        }
        _ => Err(LedgerError::Validation(format!(
            "Unknown function: {function}"
        ))),
    }
}

fn expect_args<'a, const N: usize>(
    function: &str,
    args: &[&'a str],
) -> LedgerResult<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        LedgerError::Validation(format!(
            "Incorrect number of arguments for {function}: expected {N}, got {}",
            args.len()
        ))
    })
}

fn to_json<T: Serialize>(function: &str, value: &T) -> LedgerResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| LedgerError::Serialization {
        key: function.to_string(),
        reason: e.to_string(),
    })
}
