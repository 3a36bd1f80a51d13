use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::metrics_middleware;
use super::{audit, handlers, scans, tickets, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Scanner
        .route("/scans", post(scans::submit_scan))
        .route("/scanner", get(scans::get_scanner))
        // Tickets
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets/counts", get(tickets::get_counts))
        .route("/tickets/{code}", get(tickets::get_ticket))
        // Audit
        .route("/audit/events", get(audit::query_audit))
        .route("/audit/stats", get(audit::audit_stats));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/ws", get(ws::ws_handler))
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
