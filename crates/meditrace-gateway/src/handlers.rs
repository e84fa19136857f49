//! Gateway handlers.
//!
//! Each mutation runs inside one store write transaction and each query
//! against one read snapshot, so an HTTP request is exactly one atomic
//! ledger invocation. Errors map onto status codes by kind; the body is
//! always `{"error": <message>}`.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use meditrace_ledger::{
    CommissionRequest, LedgerError, MedicationLedger, RecallRequest, TrackingEventRequest,
};

use crate::GatewayState;

fn error_response(err: &LedgerError) -> Response {
    let status = match err {
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::AlreadyExists(_) => StatusCode::CONFLICT,
        LedgerError::Serialization { .. } | LedgerError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    debug!(%status, error = %err, "request failed");
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ── Mutations ──────────────────────────────────────────────────

/// POST /api/commissionMedication
pub async fn commission_medication(
    State(state): State<GatewayState>,
    Json(req): Json<CommissionRequest>,
) -> Response {
    let result = state.store.with_txn(|txn| {
        let mut ledger = MedicationLedger::new(txn);
        ledger.commission(&state.ctx, &req)
    });
    match result {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "medicationId": id }))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/addTrackingEvent
pub async fn add_tracking_event(
    State(state): State<GatewayState>,
    Json(req): Json<TrackingEventRequest>,
) -> Response {
    let result = state.store.with_txn(|txn| {
        let mut ledger = MedicationLedger::new(txn);
        ledger.add_tracking_event(&state.ctx, &req)
    });
    match result {
        Ok(event_id) => Json(json!({ "eventId": event_id })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/issueMedicationRecall
pub async fn issue_medication_recall(
    State(state): State<GatewayState>,
    Json(req): Json<RecallRequest>,
) -> Response {
    let result = state.store.with_txn(|txn| {
        let mut ledger = MedicationLedger::new(txn);
        ledger.issue_recall(&state.ctx, &req)
    });
    match result {
        Ok(event_id) => Json(json!({ "eventId": event_id })).into_response(),
        Err(e) => error_response(&e),
    }
}

// ── Queries ────────────────────────────────────────────────────

/// `?id=` parameter. Missing decodes as empty and fails validation.
#[derive(Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: String,
}

#[derive(Deserialize)]
pub struct ManufacturerQuery {
    #[serde(default)]
    pub manufacturer: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// GET /api/verifyMedication?id=
pub async fn verify_medication(
    State(state): State<GatewayState>,
    Query(params): Query<IdQuery>,
) -> Response {
    let result = state
        .store
        .with_view(|view| MedicationLedger::new(view).verify(&state.ctx, &params.id));
    match result {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/getMedication?id=
pub async fn get_medication(
    State(state): State<GatewayState>,
    Query(params): Query<IdQuery>,
) -> Response {
    let result = state
        .store
        .with_view(|view| MedicationLedger::new(view).medication(&params.id));
    match result {
        Ok(unit) => Json(unit).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/getTrackingHistory?id=
pub async fn get_tracking_history(
    State(state): State<GatewayState>,
    Query(params): Query<IdQuery>,
) -> Response {
    let result = state
        .store
        .with_view(|view| MedicationLedger::new(view).tracking_history(&params.id));
    match result {
        Ok(history) => Json(history).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/getMedicationsByManufacturer?manufacturer=
pub async fn get_medications_by_manufacturer(
    State(state): State<GatewayState>,
    Query(params): Query<ManufacturerQuery>,
) -> Response {
    let result = state.store.with_view(|view| {
        MedicationLedger::new(view).medications_by_manufacturer(&params.manufacturer)
    });
    match result {
        Ok(units) => Json(units).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/getVerificationStats
pub async fn get_verification_stats(State(state): State<GatewayState>) -> Response {
    let result = state
        .store
        .with_view(|view| MedicationLedger::new(view).verification_stats());
    match result {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/searchMedications?query=
pub async fn search_medications(
    State(state): State<GatewayState>,
    Query(params): Query<SearchQuery>,
) -> Response {
    let result = state
        .store
        .with_view(|view| MedicationLedger::new(view).search_medications(&params.query));
    match result {
        Ok(matches) => Json(matches).into_response(),
        Err(e) => error_response(&e),
    }
}
