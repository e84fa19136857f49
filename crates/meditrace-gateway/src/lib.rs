//! meditrace-gateway — HTTP surface for the MediTrace ledger.
//!
//! Exposes the nine ledger functions under `/api/*` with the established
//! argument order and JSON shapes. Mutations are POSTs with a JSON body;
//! queries are GETs with query-string parameters.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/health` | Liveness probe |
//! | POST | `/api/commissionMedication` | Commission a new unit |
//! | POST | `/api/addTrackingEvent` | Append a custody event |
//! | POST | `/api/issueMedicationRecall` | Recall a unit |
//! | GET | `/api/verifyMedication?id=` | Verification report |
//! | GET | `/api/getMedication?id=` | Point lookup |
//! | GET | `/api/getTrackingHistory?id=` | Ordered event history |
//! | GET | `/api/getMedicationsByManufacturer?manufacturer=` | Exact-match listing |
//! | GET | `/api/getVerificationStats` | Status census |
//! | GET | `/api/searchMedications?query=` | Substring search |

pub mod config;
pub mod handlers;

use axum::Router;
use axum::routing::{get, post};

use meditrace_core::TxContext;
use meditrace_state::StateStore;

pub use config::GatewayConfig;

/// Shared state for gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub store: StateStore,
    pub ctx: TxContext,
}

/// Build the gateway router over a world-state store.
pub fn build_router(store: StateStore, ctx: TxContext) -> Router {
    let state = GatewayState { store, ctx };

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/commissionMedication", post(handlers::commission_medication))
        .route("/api/addTrackingEvent", post(handlers::add_tracking_event))
        .route("/api/issueMedicationRecall", post(handlers::issue_medication_recall))
        .route("/api/verifyMedication", get(handlers::verify_medication))
        .route("/api/getMedication", get(handlers::get_medication))
        .route("/api/getTrackingHistory", get(handlers::get_tracking_history))
        .route(
            "/api/getMedicationsByManufacturer",
            get(handlers::get_medications_by_manufacturer),
        )
        .route("/api/getVerificationStats", get(handlers::get_verification_stats))
        .route("/api/searchMedications", get(handlers::search_medications))
        .with_state(state)
}
