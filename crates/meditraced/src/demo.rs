//! Scripted traceability walkthrough.
//!
//! Replays the full medication lifecycle against an indexed in-memory
//! ledger: commission two units, move one through the supply chain, verify
//! it, recall the other, and finish with the aggregate queries. Payloads
//! are printed as the JSON a gateway client would receive.

use meditrace_core::{TxContext, VerificationResult};
use meditrace_ledger::{
    CommissionRequest, MedicationLedger, RecallRequest, TrackingEventRequest,
};
use meditrace_state::MemoryState;

pub fn run() -> anyhow::Result<()> {
    let ctx = TxContext::new("Org1MSP", "pharmachannel", "drugtraceability");
    let mut ledger = MedicationLedger::with_index(MemoryState::new())?;

    println!("── Commissioning ─────────────────────────────────────");
    let paracetamol = ledger.commission(
        &ctx,
        &CommissionRequest {
            gtin: "7501001234567".to_string(),
            batch: "BATCH001".to_string(),
            serial_number: "SN001".to_string(),
            expiry_date: "2025-12-31".to_string(),
            manufacturer: "PharmaCorp".to_string(),
            product_name: "Paracetamol 500mg".to_string(),
            location: "Manufacturing Plant A".to_string(),
        },
    )?;
    println!("commissioned {paracetamol}");

    let ibuprofen = ledger.commission(
        &ctx,
        &CommissionRequest {
            gtin: "7501007654321".to_string(),
            batch: "BATCH002".to_string(),
            serial_number: "SN002".to_string(),
            expiry_date: "2026-06-30".to_string(),
            manufacturer: "FarmaPeru".to_string(),
            product_name: "Ibuprofen 400mg".to_string(),
            location: "Manufacturing Plant B".to_string(),
        },
    )?;
    println!("commissioned {ibuprofen}");

    println!("\n── Supply chain ──────────────────────────────────────");
    for (event, location, actor) in [
        ("ship", "Distribution Center B", "LogisticsCorp"),
        ("receive", "Pharmacy C", "Pharmacy C"),
        ("dispense", "Pharmacy C", "Pharmacist Lopez"),
    ] {
        let event_id = ledger.add_tracking_event(
            &ctx,
            &TrackingEventRequest {
                medication_id: paracetamol.clone(),
                event: event.to_string(),
                location: location.to_string(),
                actor: actor.to_string(),
                signature: String::new(),
            },
        )?;
        println!("{event} at {location} → {event_id}");
    }

    println!("\n── Verification ──────────────────────────────────────");
    print_report(&ledger.verify(&ctx, &paracetamol)?)?;

    println!("\n── Recall ────────────────────────────────────────────");
    let recall_event = ledger.issue_recall(
        &ctx,
        &RecallRequest {
            medication_id: ibuprofen.clone(),
            reason: "contamination detected in batch".to_string(),
            issuer: "National Regulator".to_string(),
        },
    )?;
    println!("recall issued → {recall_event}");
    print_report(&ledger.verify(&ctx, &ibuprofen)?)?;

    println!("\n── Aggregates ────────────────────────────────────────");
    let stats = ledger.verification_stats()?;
    println!("stats: {}", serde_json::to_string(&stats)?);

    let hits = ledger.search_medications("Paracetamol")?;
    println!(
        "search \"Paracetamol\": {:?}",
        hits.iter().map(|unit| unit.id.as_str()).collect::<Vec<_>>()
    );

    let by_pharma = ledger.medications_by_manufacturer("PharmaCorp")?;
    println!(
        "by manufacturer \"PharmaCorp\": {:?}",
        by_pharma.iter().map(|unit| unit.id.as_str()).collect::<Vec<_>>()
    );

    Ok(())
}

fn print_report(report: &VerificationResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
