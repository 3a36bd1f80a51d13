//! Ticket registry: records, lookup/mutation operations, persisted snapshot.
//!
//! The registry is the source of truth the scanner consults and mutates.
//! `TicketRegistry` is the seam; `JsonFileRegistry` is the file-backed
//! implementation used in production.

mod json_store;
mod seed;
mod store;
mod types;

pub use json_store::JsonFileRegistry;
pub use seed::seed_records;
pub use store::{RegistryError, SnapshotFilter, TicketRegistry};
pub use types::{used_at_label, StatusCounts, TicketRecord, TicketStatus};
