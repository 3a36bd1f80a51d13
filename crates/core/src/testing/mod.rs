//! Testing utilities and mock implementations.
//!
//! This module provides a controllable in-memory registry so scan behavior
//! can be tested without touching the filesystem, including failure modes a
//! real store cannot produce on demand.
//!
//! # Example
//!
//! ```rust,ignore
//! use doorman_core::testing::MockRegistry;
//!
//! let registry = MockRegistry::with_seed();
//! registry.force_mark_conflict(true);
//!
//! // Use in a TicketScanner...
//! ```

mod mock_registry;

pub use mock_registry::MockRegistry;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::registry::{TicketRecord, TicketStatus};

    /// Create a ticket that has been sold but not yet redeemed.
    pub fn sold_ticket(code: &str, category: &str) -> TicketRecord {
        TicketRecord::new(code, category, TicketStatus::Sold)
    }

    /// Create a ticket that has not been activated for entry.
    pub fn available_ticket(code: &str, category: &str) -> TicketRecord {
        TicketRecord::new(code, category, TicketStatus::Available)
    }

    /// Create a ticket that was already redeemed at the given time label.
    pub fn used_ticket(code: &str, category: &str, used_at: &str) -> TicketRecord {
        TicketRecord::used(code, category, used_at)
    }
}
