//! Registry trait and query types.

use super::types::{StatusCounts, TicketRecord, TicketStatus};

/// Errors from registry operations
#[derive(Debug)]
pub enum RegistryError {
    /// No ticket with the given code exists
    NotFound(String),
    /// The ticket's current status does not allow the operation
    InvalidTransition { code: String, status: TicketStatus },
    /// Underlying storage failed (IO, serialization)
    Storage(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NotFound(code) => write!(f, "Ticket not found: {}", code),
            RegistryError::InvalidTransition { code, status } => {
                write!(
                    f,
                    "Cannot mark ticket {} as used: current status is {}",
                    code, status
                )
            }
            RegistryError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Filter for registry snapshots
#[derive(Debug, Clone, Default)]
pub struct SnapshotFilter {
    /// Case-insensitive substring match on the ticket code
    pub search: Option<String>,
    /// Restrict to a single status
    pub status: Option<TicketStatus>,
}

impl SnapshotFilter {
    pub fn new() -> Self {
        Self {
            search: None,
            status: None,
        }
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Trait for ticket registry implementations
pub trait TicketRegistry: Send + Sync {
    /// Look up a ticket by its exact code
    fn find_by_code(&self, code: &str) -> Result<Option<TicketRecord>, RegistryError>;

    /// Transition a Sold ticket to Used, stamping the time of entry.
    ///
    /// Fails with `NotFound` if the code is unknown and `InvalidTransition`
    /// if the ticket is not currently Sold. The updated record is persisted
    /// before this returns.
    fn mark_used(&self, code: &str) -> Result<TicketRecord, RegistryError>;

    /// List tickets matching the filter, in registry order
    fn snapshot(&self, filter: &SnapshotFilter) -> Result<Vec<TicketRecord>, RegistryError>;

    /// Count tickets per status
    fn counts(&self) -> Result<StatusCounts, RegistryError>;
}
