use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::error;

use super::AuditEvent;

/// Envelope wrapping an audit event with metadata
#[derive(Debug, Clone)]
pub struct AuditEventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
}

/// Handle for emitting audit events
///
/// This is cheaply cloneable and can be shared across tasks.
/// Events are sent through an async channel to be written by the AuditWriter.
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEventEnvelope>,
}

impl AuditHandle {
    pub(crate) fn new(tx: mpsc::Sender<AuditEventEnvelope>) -> Self {
        Self { tx }
    }

    /// Emit an audit event, waiting if the channel is full.
    ///
    /// A send failure means the writer is gone; the event is logged and
    /// dropped rather than propagated as an error.
    pub async fn emit(&self, event: AuditEvent) {
        let envelope = AuditEventEnvelope {
            timestamp: Utc::now(),
            event,
        };

        if let Err(e) = self.tx.send(envelope).await {
            error!("Failed to emit audit event: {}", e);
        }
    }

    /// Emit an audit event from a blocking context.
    pub fn emit_blocking(&self, event: AuditEvent) {
        let envelope = AuditEventEnvelope {
            timestamp: Utc::now(),
            event,
        };

        if let Err(e) = self.tx.blocking_send(envelope) {
            error!("Failed to emit audit event: {}", e);
        }
    }

    /// Emit an audit event without waiting. Returns false if the event was
    /// dropped because the channel was full or closed.
    pub fn try_emit(&self, event: AuditEvent) -> bool {
        let envelope = AuditEventEnvelope {
            timestamp: Utc::now(),
            event,
        };

        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to emit audit event: {}", e);
                false
            }
        }
    }
}
