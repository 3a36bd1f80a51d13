use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AuditRecord;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Filter for querying audit events
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub ticket_code: Option<String>,
    pub event_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self {
            limit: 100,
            offset: 0,
            ..Default::default()
        }
    }

    pub fn with_ticket_code(mut self, ticket_code: impl Into<String>) -> Self {
        self.ticket_code = Some(ticket_code.into());
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_time_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Aggregate statistics over the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    /// All events ever recorded
    pub total_events: i64,
    /// Event count keyed by event type
    pub events_by_type: HashMap<String, i64>,
}

/// Trait for audit storage backends
pub trait AuditStore: Send + Sync {
    /// Insert a record, returning its assigned id
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError>;

    /// Query records matching the filter, newest first
    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError>;

    /// Count records matching the filter (ignoring limit/offset)
    fn count(&self, filter: &AuditFilter) -> Result<i64, AuditError>;

    /// Aggregate statistics over the whole log
    fn stats(&self) -> Result<AuditStats, AuditError>;
}
