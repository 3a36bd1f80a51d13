//! Audit trail for scans and service lifecycle.
//!
//! Components emit events through a cloneable `AuditHandle`; a single
//! `AuditWriter` task drains the channel into an `AuditStore`.

mod events;
mod handle;
mod sqlite;
mod store;
mod writer;

pub use events::*;
pub use handle::*;
pub use sqlite::*;
pub use store::*;
pub use writer::*;
