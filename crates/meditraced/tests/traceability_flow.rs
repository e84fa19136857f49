//! End-to-end traceability flows against the persistent store.
//!
//! Runs the dispatch surface the way a deployed daemon does: every
//! mutation inside one write transaction, every query against one read
//! snapshot.

use serde_json::Value;

use meditrace_core::TxContext;
use meditrace_ledger::{LedgerError, MedicationLedger, dispatch};
use meditrace_state::{StateStore, StateView};

fn test_ctx() -> TxContext {
    TxContext::new("Org1MSP", "pharmachannel", "drugtraceability")
}

fn execute(store: &StateStore, ctx: &TxContext, function: &str, args: &[&str]) -> Result<Vec<u8>, LedgerError> {
    store.with_txn(|txn| {
        let mut ledger = MedicationLedger::new(txn);
        dispatch::execute(&mut ledger, ctx, function, args)
    })
}

fn query(store: &StateStore, ctx: &TxContext, function: &str, args: &[&str]) -> Result<Value, LedgerError> {
    let payload = store.with_view(|view| {
        let ledger = MedicationLedger::new(view);
        dispatch::query(&ledger, ctx, function, args)
    })?;
    Ok(serde_json::from_slice(&payload).unwrap())
}

fn commission_args() -> [&'static str; 7] {
    [
        "7501001234567",
        "BATCH001",
        "SN001",
        "2025-12-31",
        "PharmaCorp",
        "Paracetamol 500mg",
        "Manufacturing Plant A",
    ]
}

#[test]
fn full_lifecycle_through_dispatch() {
    let store = StateStore::open_in_memory().unwrap();
    let ctx = test_ctx();

    let id = execute(&store, &ctx, "commissionMedication", &commission_args()).unwrap();
    assert_eq!(id, b"BATCH001-SN001");

    for (event, location, actor) in [
        ("ship", "Distribution Center B", "LogisticsCorp"),
        ("receive", "Pharmacy C", "Pharmacy C"),
        ("dispense", "Pharmacy C", "Pharmacist Lopez"),
    ] {
        execute(
            &store,
            &ctx,
            "addTrackingEvent",
            &["BATCH001-SN001", event, location, actor, ""],
        )
        .unwrap();
    }

    let report = query(&store, &ctx, "verifyMedication", &["BATCH001-SN001"]).unwrap();
    assert_eq!(report["isValid"], true);
    assert_eq!(report["currentHolder"], "Pharmacist Lopez");
    assert_eq!(report["trackingHistory"].as_array().unwrap().len(), 4);
    assert_eq!(report["medicationData"]["location"], "Pharmacy C");

    execute(
        &store,
        &ctx,
        "issueMedicationRecall",
        &["BATCH001-SN001", "contamination", "National Regulator"],
    )
    .unwrap();

    let report = query(&store, &ctx, "verifyMedication", &["BATCH001-SN001"]).unwrap();
    assert_eq!(report["isValid"], false);
    assert_eq!(report["medicationData"]["recallReason"], "contamination");
    // The recall event records the unit's location at recall time.
    let history = report["trackingHistory"].as_array().unwrap();
    assert_eq!(history.last().unwrap()["event"], "recall");
    assert_eq!(history.last().unwrap()["location"], "Pharmacy C");

    let stats = query(&store, &ctx, "getVerificationStats", &[]).unwrap();
    assert_eq!(stats["totalVerifications"], 1);
    assert_eq!(stats["authenticMedications"], 0);
    assert_eq!(stats["alertsActive"], 1);
}

#[test]
fn failed_invocation_writes_nothing() {
    let store = StateStore::open_in_memory().unwrap();
    let ctx = test_ctx();
    execute(&store, &ctx, "commissionMedication", &commission_args()).unwrap();

    // Duplicate commission aborts its transaction.
    let err = execute(&store, &ctx, "commissionMedication", &commission_args()).unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExists(_)));

    // Event for a missing unit aborts too.
    let err = execute(
        &store,
        &ctx,
        "addTrackingEvent",
        &["NOPE-1", "ship", "Anywhere", "Anyone", ""],
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));

    // Exactly the original unit and its commission event remain.
    let entries = store
        .with_view::<_, LedgerError, _>(|view| Ok(view.range_scan("", "")?))
        .unwrap();
    assert_eq!(entries.len(), 2);

    let history = query(&store, &ctx, "getTrackingHistory", &["BATCH001-SN001"]).unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("meditrace.redb");
    let ctx = test_ctx();

    {
        let store = StateStore::open(&db_path).unwrap();
        execute(&store, &ctx, "commissionMedication", &commission_args()).unwrap();
        execute(
            &store,
            &ctx,
            "addTrackingEvent",
            &["BATCH001-SN001", "ship", "DC B", "LogisticsCorp", ""],
        )
        .unwrap();
    }

    let store = StateStore::open(&db_path).unwrap();
    let report = query(&store, &ctx, "verifyMedication", &["BATCH001-SN001"]).unwrap();
    assert_eq!(report["isValid"], true);
    assert_eq!(report["currentHolder"], "LogisticsCorp");
    assert_eq!(report["trackingHistory"].as_array().unwrap().len(), 2);
}

#[test]
fn status_is_monotonic_across_invocations() {
    let store = StateStore::open_in_memory().unwrap();
    let ctx = test_ctx();
    execute(&store, &ctx, "commissionMedication", &commission_args()).unwrap();
    execute(
        &store,
        &ctx,
        "issueMedicationRecall",
        &["BATCH001-SN001", "contamination", "Regulator"],
    )
    .unwrap();

    // No further event sequence reactivates the unit.
    for event in ["receive", "ship", "dispense"] {
        execute(
            &store,
            &ctx,
            "addTrackingEvent",
            &["BATCH001-SN001", event, "Somewhere", "Someone", ""],
        )
        .unwrap();
    }
    let unit = query(&store, &ctx, "getMedication", &["BATCH001-SN001"]).unwrap();
    assert_eq!(unit["status"], "recalled");

    // Re-recalling overwrites the reason, never errors.
    execute(
        &store,
        &ctx,
        "issueMedicationRecall",
        &["BATCH001-SN001", "updated reason", "Regulator"],
    )
    .unwrap();
    let unit = query(&store, &ctx, "getMedication", &["BATCH001-SN001"]).unwrap();
    assert_eq!(unit["status"], "recalled");
    assert_eq!(unit["recallReason"], "updated reason");
}
