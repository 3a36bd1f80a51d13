//! Audit event definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events recorded in the audit log.
///
/// Scan events carry the ticket code they concern; service events mark the
/// lifecycle of the process itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A code was submitted to the scanner
    ScanSubmitted { code: String },

    /// The scanner granted entry and consumed the ticket
    AccessGranted { code: String, category: String },

    /// The scanner denied entry
    AccessDenied { code: String, reason: String },

    /// The service started
    ServiceStarted { version: String, config_hash: String },

    /// The service stopped
    ServiceStopped { reason: String },
}

impl AuditEvent {
    /// Get the event type as a string (matches the serde tag)
    pub fn event_type(&self) -> &'static str {
        match self {
            AuditEvent::ScanSubmitted { .. } => "scan_submitted",
            AuditEvent::AccessGranted { .. } => "access_granted",
            AuditEvent::AccessDenied { .. } => "access_denied",
            AuditEvent::ServiceStarted { .. } => "service_started",
            AuditEvent::ServiceStopped { .. } => "service_stopped",
        }
    }

    /// Get the ticket code this event concerns, if any
    pub fn ticket_code(&self) -> Option<&str> {
        match self {
            AuditEvent::ScanSubmitted { code }
            | AuditEvent::AccessGranted { code, .. }
            | AuditEvent::AccessDenied { code, .. } => Some(code),
            AuditEvent::ServiceStarted { .. } | AuditEvent::ServiceStopped { .. } => None,
        }
    }
}

/// A persisted audit record.
///
/// `event_type` and `ticket_code` are denormalized from the event so the
/// store can index and filter on them; `data` holds the full payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Store-assigned id
    pub id: i64,
    /// When the event was emitted (not when it was written)
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub ticket_code: Option<String>,
    pub data: AuditEvent,
}
