//! Scan API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use doorman_core::{ScanError, ScanState};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a scan
#[derive(Debug, Deserialize)]
pub struct SubmitScanBody {
    /// Ticket code read from the badge or QR scanner
    pub code: String,
}

/// Current scanner status
#[derive(Debug, Serialize)]
pub struct ScannerStatusResponse {
    pub state: ScanState,
    pub accepting: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ScanErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a ticket code for validation.
///
/// Returns 202 with the processing state; the verdict arrives over the
/// WebSocket once the scan resolves.
pub async fn submit_scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitScanBody>,
) -> Result<(StatusCode, Json<ScanState>), impl IntoResponse> {
    match state.scanner().submit(&body.code) {
        Ok(scan_state) => Ok((StatusCode::ACCEPTED, Json(scan_state))),
        Err(e @ ScanError::EmptyInput) => Err((
            StatusCode::BAD_REQUEST,
            Json(ScanErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e @ ScanError::ScanInFlight) => Err((
            StatusCode::CONFLICT,
            Json(ScanErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Current scanner state and whether it accepts submissions
pub async fn get_scanner(State(state): State<Arc<AppState>>) -> Json<ScannerStatusResponse> {
    Json(ScannerStatusResponse {
        state: state.scanner().state(),
        accepting: state.scanner().is_accepting(),
    })
}
