//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Scanner (submissions, decisions, denial reasons)
//! - Registry (snapshot writes)

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

// =============================================================================
// Scanner Metrics
// =============================================================================

/// Codes submitted to the scanner (accepted submissions only).
pub static SCANS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("doorman_scans_submitted_total", "Total scans submitted").unwrap()
});

/// Scan verdicts by result.
pub static SCAN_DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doorman_scan_decisions_total", "Total scan verdicts"),
        &["result"], // "granted", "denied"
    )
    .unwrap()
});

/// Denials by reason.
pub static SCAN_DENIALS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doorman_scan_denials_total", "Total scan denials"),
        &["reason"], // "not_found", "already_used", "not_activated", "race", "registry_error"
    )
    .unwrap()
});

// =============================================================================
// Registry Metrics
// =============================================================================

/// Full snapshot rewrites of the registry file.
pub static REGISTRY_WRITES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "doorman_registry_writes_total",
        "Total registry snapshot writes",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Scanner
        Box::new(SCANS_SUBMITTED.clone()),
        Box::new(SCAN_DECISIONS.clone()),
        Box::new(SCAN_DENIALS.clone()),
        // Registry
        Box::new(REGISTRY_WRITES.clone()),
    ]
}
