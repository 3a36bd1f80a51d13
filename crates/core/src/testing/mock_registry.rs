//! Mock ticket registry for testing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::registry::{
    seed_records, RegistryError, SnapshotFilter, StatusCounts, TicketRecord, TicketRegistry,
    TicketStatus,
};

/// Time label stamped by the mock on successful `mark_used`
const MOCK_USED_AT: &str = "12:00 PM";

/// Mock implementation of the TicketRegistry trait.
///
/// Provides controllable behavior for testing:
/// - Force `mark_used` conflicts (a ticket that changes status mid-scan)
/// - Fail reads or writes (a broken store)
/// - Record `mark_used` call counts for assertions
pub struct MockRegistry {
    records: Mutex<Vec<TicketRecord>>,
    force_mark_conflict: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    mark_used_calls: AtomicU64,
}

impl MockRegistry {
    pub fn new(records: Vec<TicketRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            force_mark_conflict: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            mark_used_calls: AtomicU64::new(0),
        }
    }

    /// Mock populated with the default seed dataset
    pub fn with_seed() -> Self {
        Self::new(seed_records())
    }

    /// When set, every `mark_used` fails with `InvalidTransition` as if the
    /// ticket had been consumed between the lookup and the write
    pub fn force_mark_conflict(&self, on: bool) {
        self.force_mark_conflict.store(on, Ordering::SeqCst);
    }

    /// When set, reads fail with a storage error
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    /// When set, `mark_used` fails with a storage error
    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    /// Number of `mark_used` calls made, successful or not
    pub fn mark_used_calls(&self) -> u64 {
        self.mark_used_calls.load(Ordering::SeqCst)
    }
}

impl TicketRegistry for MockRegistry {
    fn find_by_code(&self, code: &str) -> Result<Option<TicketRecord>, RegistryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RegistryError::Storage("mock read failure".to_string()));
        }

        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.code == code).cloned())
    }

    fn mark_used(&self, code: &str) -> Result<TicketRecord, RegistryError> {
        self.mark_used_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RegistryError::Storage("mock write failure".to_string()));
        }

        if self.force_mark_conflict.load(Ordering::SeqCst) {
            return Err(RegistryError::InvalidTransition {
                code: code.to_string(),
                status: TicketStatus::Used,
            });
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.code == code)
            .ok_or_else(|| RegistryError::NotFound(code.to_string()))?;

        if record.status != TicketStatus::Sold {
            return Err(RegistryError::InvalidTransition {
                code: code.to_string(),
                status: record.status,
            });
        }

        record.status = TicketStatus::Used;
        record.used_at = Some(MOCK_USED_AT.to_string());
        Ok(record.clone())
    }

    fn snapshot(&self, filter: &SnapshotFilter) -> Result<Vec<TicketRecord>, RegistryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RegistryError::Storage("mock read failure".to_string()));
        }

        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| {
                filter
                    .search
                    .as_ref()
                    .map(|s| r.code.to_lowercase().contains(&s.to_lowercase()))
                    .unwrap_or(true)
                    && filter.status.map(|s| r.status == s).unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    fn counts(&self) -> Result<StatusCounts, RegistryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RegistryError::Storage("mock read failure".to_string()));
        }

        let records = self.records.lock().unwrap();
        let mut counts = StatusCounts::default();
        for record in records.iter() {
            match record.status {
                TicketStatus::Available => counts.available += 1,
                TicketStatus::Sold => counts.sold += 1,
                TicketStatus::Used => counts.used += 1,
            }
        }
        Ok(counts)
    }
}
