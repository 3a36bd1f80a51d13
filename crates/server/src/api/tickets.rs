//! Ticket registry API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use doorman_core::{SnapshotFilter, TicketRecord, TicketStatus};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// Case-insensitive substring match on ticket codes
    pub search: Option<String>,
    /// Filter by status ("available", "sold", "used", or "all")
    pub status: Option<String>,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<TicketRecord>,
    pub total: usize,
}

/// Response for registry-wide counts
#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub available: u64,
    pub sold: u64,
    pub used: u64,
    pub total: u64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TicketErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List tickets with optional search and status filters
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, impl IntoResponse> {
    let mut filter = SnapshotFilter::new();

    if let Some(ref search) = params.search {
        filter = filter.with_search(search);
    }

    // "all" is an explicit no-filter value so dashboards can always send the param
    match params.status.as_deref() {
        None | Some("all") => {}
        Some(raw) => match TicketStatus::parse(raw) {
            Some(status) => filter = filter.with_status(status),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(TicketErrorResponse {
                        error: format!("Unknown ticket status: {}", raw),
                    }),
                ));
            }
        },
    }

    match state.registry().snapshot(&filter) {
        Ok(tickets) => Ok(Json(ListTicketsResponse {
            total: tickets.len(),
            tickets,
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TicketErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Counts for the whole registry, ignoring any list filters
pub async fn get_counts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountsResponse>, impl IntoResponse> {
    match state.registry().counts() {
        Ok(counts) => Ok(Json(CountsResponse {
            available: counts.available,
            sold: counts.sold,
            used: counts.used,
            total: counts.total(),
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TicketErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Get a single ticket by its exact code
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<TicketRecord>, impl IntoResponse> {
    match state.registry().find_by_code(&code) {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(TicketErrorResponse {
                error: format!("Ticket not found: {}", code),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TicketErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
