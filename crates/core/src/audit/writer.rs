use std::sync::Arc;

use tokio::sync::mpsc;

use super::{AuditEventEnvelope, AuditHandle, AuditRecord, AuditStore};

/// Background task that receives audit events and writes them to storage
pub struct AuditWriter {
    rx: mpsc::Receiver<AuditEventEnvelope>,
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    /// Create a new audit writer
    pub fn new(rx: mpsc::Receiver<AuditEventEnvelope>, store: Arc<dyn AuditStore>) -> Self {
        Self { rx, store }
    }

    /// Run the writer, consuming events until the channel is closed
    ///
    /// This should be spawned as a background task. It exits once every
    /// `AuditHandle` clone has been dropped and the channel drained.
    pub async fn run(mut self) {
        tracing::info!("Audit writer started");

        while let Some(envelope) = self.rx.recv().await {
            let record = AuditRecord {
                // Assigned by the store on insert
                id: 0,
                timestamp: envelope.timestamp,
                event_type: envelope.event.event_type().to_string(),
                ticket_code: envelope.event.ticket_code().map(|c| c.to_string()),
                data: envelope.event,
            };

            if let Err(e) = self.store.insert(&record) {
                tracing::error!("Failed to persist audit event: {}", e);
            }
        }

        tracing::info!("Audit writer shutting down");
    }
}

/// Create a connected audit handle and writer pair.
///
/// The handle fans in events from any number of tasks; the writer drains
/// them into the store. Spawn the writer's `run()` and keep its join handle
/// if you want to wait for the log to flush on shutdown.
pub fn create_audit_system(
    store: Arc<dyn AuditStore>,
    buffer_size: usize,
) -> (AuditHandle, AuditWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (AuditHandle::new(tx), AuditWriter::new(rx, store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditError, AuditEvent, AuditFilter, AuditStats};
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockStore {
        records: Mutex<Vec<AuditRecord>>,
        should_fail: Mutex<bool>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                should_fail: Mutex::new(false),
            }
        }

        fn records(&self) -> Vec<AuditRecord> {
            self.records.lock().unwrap().clone()
        }

        fn set_should_fail(&self, fail: bool) {
            *self.should_fail.lock().unwrap() = fail;
        }
    }

    impl AuditStore for MockStore {
        fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
            if *self.should_fail.lock().unwrap() {
                return Err(AuditError::Database("mock failure".to_string()));
            }
            let mut records = self.records.lock().unwrap();
            records.push(record.clone());
            Ok(records.len() as i64)
        }

        fn query(&self, _filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
            Ok(self.records())
        }

        fn count(&self, _filter: &AuditFilter) -> Result<i64, AuditError> {
            Ok(self.records.lock().unwrap().len() as i64)
        }

        fn stats(&self) -> Result<AuditStats, AuditError> {
            let records = self.records.lock().unwrap();
            let mut events_by_type = std::collections::HashMap::new();
            for record in records.iter() {
                *events_by_type.entry(record.event_type.clone()).or_insert(0) += 1;
            }
            Ok(AuditStats {
                total_events: records.len() as i64,
                events_by_type,
            })
        }
    }

    #[tokio::test]
    async fn test_writer_persists_events() {
        let store = Arc::new(MockStore::new());
        let (handle, writer) = create_audit_system(Arc::clone(&store) as Arc<dyn AuditStore>, 16);

        let writer_task = tokio::spawn(writer.run());

        handle
            .emit(AuditEvent::ScanSubmitted {
                code: "VIP-GALA-001".to_string(),
            })
            .await;
        handle
            .emit(AuditEvent::AccessGranted {
                code: "VIP-GALA-001".to_string(),
                category: "VIP".to_string(),
            })
            .await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_type, "scan_submitted");
        assert_eq!(records[0].ticket_code, Some("VIP-GALA-001".to_string()));
        assert_eq!(records[1].event_type, "access_granted");

        drop(handle);
        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_writer_exits_when_handles_drop() {
        let store = Arc::new(MockStore::new());
        let (handle, writer) = create_audit_system(Arc::clone(&store) as Arc<dyn AuditStore>, 16);

        let writer_task = tokio::spawn(writer.run());

        handle
            .emit(AuditEvent::ServiceStopped {
                reason: "test".to_string(),
            })
            .await;
        drop(handle);

        // The writer drains the channel and exits on its own
        tokio::time::timeout(Duration::from_millis(500), writer_task)
            .await
            .expect("writer did not exit")
            .unwrap();

        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn test_writer_survives_store_failures() {
        let store = Arc::new(MockStore::new());
        let (handle, writer) = create_audit_system(Arc::clone(&store) as Arc<dyn AuditStore>, 16);

        let writer_task = tokio::spawn(writer.run());

        store.set_should_fail(true);
        handle
            .emit(AuditEvent::ScanSubmitted {
                code: "LOST-1".to_string(),
            })
            .await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        store.set_should_fail(false);
        handle
            .emit(AuditEvent::ScanSubmitted {
                code: "KEPT-1".to_string(),
            })
            .await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        // The failed insert was dropped, the writer kept going
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticket_code, Some("KEPT-1".to_string()));

        drop(handle);
        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_cloned_handles_share_the_writer() {
        let store = Arc::new(MockStore::new());
        let (handle, writer) = create_audit_system(Arc::clone(&store) as Arc<dyn AuditStore>, 16);

        let writer_task = tokio::spawn(writer.run());

        let clone = handle.clone();
        clone
            .emit(AuditEvent::ServiceStarted {
                version: "0.1.0".to_string(),
                config_hash: "abc".to_string(),
            })
            .await;
        handle
            .emit(AuditEvent::ServiceStopped {
                reason: "done".to_string(),
            })
            .await;

        drop(handle);
        drop(clone);
        writer_task.await.unwrap();

        assert_eq!(store.records().len(), 2);
    }
}
