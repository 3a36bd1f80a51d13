//! Ticket scanner driving the scan lifecycle.
//!
//! The scanner accepts one code at a time and walks it through the state
//! machine: Idle -> Processing -> Accepted/Denied -> Idle. Timing comes
//! from `ScannerConfig`; the verdict comes from the registry.

mod config;
mod runner;
mod types;

pub use config::ScannerConfig;
pub use runner::TicketScanner;
pub use types::{Decision, ScanError, ScanState};
