//! Scan lifecycle types.
//!
//! A scan moves Idle -> Processing -> (Accepted | Denied) -> Idle. The
//! decision states carry the operator-facing verdict; the timing of the
//! transitions is owned by the scanner runner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operator-facing verdict of a resolved scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    /// Whether entry was granted
    pub success: bool,
    /// Banner line ("ACCESS GRANTED" / "ACCESS DENIED")
    pub title: String,
    /// One-line explanation for the operator
    pub message: String,
}

impl Decision {
    pub fn granted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            title: "ACCESS GRANTED".to_string(),
            message: message.into(),
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            success: false,
            title: "ACCESS DENIED".to_string(),
            message: message.into(),
        }
    }
}

/// State of the scan lifecycle.
///
/// Exactly one scan is in flight at a time; every state other than `Idle`
/// belongs to that scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanState {
    /// Ready to accept the next code
    Idle,
    /// A code was submitted and is being checked
    Processing { code: String },
    /// Entry granted, dwelling before the return to Idle
    Accepted { decision: Decision },
    /// Entry denied, dwelling before the return to Idle
    Denied { decision: Decision },
}

impl ScanState {
    /// Get the state type as a string (for logging and metrics)
    pub fn state_type(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Processing { .. } => "processing",
            ScanState::Accepted { .. } => "accepted",
            ScanState::Denied { .. } => "denied",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ScanState::Idle)
    }

    /// The verdict, if this is a decision state
    pub fn decision(&self) -> Option<&Decision> {
        match self {
            ScanState::Accepted { decision } | ScanState::Denied { decision } => Some(decision),
            _ => None,
        }
    }
}

/// Errors from submitting a scan
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// The submitted code was empty or whitespace-only
    #[error("Ticket code must not be empty")]
    EmptyInput,

    /// Another scan is still in flight (processing or dwelling)
    #[error("A scan is already in progress")]
    ScanInFlight,
}
