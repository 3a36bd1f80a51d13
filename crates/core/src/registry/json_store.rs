//! JSON-file-backed ticket registry.
//!
//! The registry is a single JSON array of ticket records. The whole file is
//! read once at startup and rewritten in full after every mutation, so the
//! on-disk snapshot always reflects the current state. A missing file is
//! seeded with the default dataset.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing::{debug, info};

use super::seed::seed_records;
use super::store::{RegistryError, SnapshotFilter, TicketRegistry};
use super::types::{used_at_label, StatusCounts, TicketRecord, TicketStatus};
use crate::metrics::REGISTRY_WRITES;

/// Ticket registry persisted as a JSON array on disk
#[derive(Debug)]
pub struct JsonFileRegistry {
    records: Mutex<Vec<TicketRecord>>,
    path: Option<PathBuf>,
}

impl JsonFileRegistry {
    /// Open the registry at `path`, creating and seeding it if the file
    /// does not exist yet
    pub fn new(path: &Path) -> Result<Self, RegistryError> {
        let records = if path.exists() {
            let raw =
                fs::read_to_string(path).map_err(|e| RegistryError::Storage(e.to_string()))?;
            let records: Vec<TicketRecord> =
                serde_json::from_str(&raw).map_err(|e| RegistryError::Storage(e.to_string()))?;
            debug!("Loaded {} tickets from {}", records.len(), path.display());
            records
        } else {
            let records = seed_records();
            write_snapshot(path, &records)?;
            info!(
                "Registry file {} not found, seeded {} tickets",
                path.display(),
                records.len()
            );
            records
        };

        Ok(Self {
            records: Mutex::new(records),
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory registry with the default seed dataset (useful for testing)
    pub fn in_memory() -> Self {
        Self::in_memory_with(seed_records())
    }

    /// In-memory registry with caller-provided records (useful for testing)
    pub fn in_memory_with(records: Vec<TicketRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            path: None,
        }
    }

    fn persist(&self, records: &[TicketRecord]) -> Result<(), RegistryError> {
        if let Some(ref path) = self.path {
            write_snapshot(path, records)?;
        }
        Ok(())
    }

    fn matches(filter: &SnapshotFilter, record: &TicketRecord) -> bool {
        if let Some(ref search) = filter.search {
            if !record
                .code
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }

        if let Some(status) = filter.status {
            if record.status != status {
                return false;
            }
        }

        true
    }
}

fn write_snapshot(path: &Path, records: &[TicketRecord]) -> Result<(), RegistryError> {
    let json =
        serde_json::to_string_pretty(records).map_err(|e| RegistryError::Storage(e.to_string()))?;
    fs::write(path, json).map_err(|e| RegistryError::Storage(e.to_string()))?;
    REGISTRY_WRITES.inc();
    Ok(())
}

impl TicketRegistry for JsonFileRegistry {
    fn find_by_code(&self, code: &str) -> Result<Option<TicketRecord>, RegistryError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.code == code).cloned())
    }

    fn mark_used(&self, code: &str) -> Result<TicketRecord, RegistryError> {
        let mut records = self.records.lock().unwrap();

        let index = records
            .iter()
            .position(|r| r.code == code)
            .ok_or_else(|| RegistryError::NotFound(code.to_string()))?;

        if records[index].status != TicketStatus::Sold {
            return Err(RegistryError::InvalidTransition {
                code: code.to_string(),
                status: records[index].status,
            });
        }

        let previous = records[index].clone();
        records[index].status = TicketStatus::Used;
        records[index].used_at = Some(used_at_label(Local::now().time()));

        // A failed write must not consume the ticket
        if let Err(e) = self.persist(&records) {
            records[index] = previous;
            return Err(e);
        }

        let updated = records[index].clone();
        debug!("Ticket {} marked used at {:?}", code, updated.used_at);

        Ok(updated)
    }

    fn snapshot(&self, filter: &SnapshotFilter) -> Result<Vec<TicketRecord>, RegistryError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| Self::matches(filter, r))
            .cloned()
            .collect())
    }

    fn counts(&self) -> Result<StatusCounts, RegistryError> {
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
