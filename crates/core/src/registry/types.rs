//! Core ticket registry data types.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Ticket Status
// ============================================================================

/// Status of a ticket with respect to entry scanning.
///
/// `Sold` is the only status that admits; a successful scan moves the ticket
/// to `Used`. `Available` (never sold) and `Used` are terminal for scanning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// In the pool, never sold. Cannot admit.
    Available,
    /// Sold and unconsumed. Admits exactly once.
    Sold,
    /// Already consumed at the gate.
    Used,
}

impl TicketStatus {
    /// Returns the status as its wire/filter string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Available => "available",
            TicketStatus::Sold => "sold",
            TicketStatus::Used => "used",
        }
    }

    /// Parses a filter string. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(TicketStatus::Available),
            "sold" => Some(TicketStatus::Sold),
            "used" => Some(TicketStatus::Used),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Ticket Record
// ============================================================================

/// Serialization of `used_at`: the snapshot format stores `"-"` for a ticket
/// that has never been consumed, otherwise a local clock label.
mod used_at_repr {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(label) => serializer.serialize_str(label),
            None => serializer.serialize_str("-"),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "-" => None,
            _ => Some(raw),
        })
    }
}

/// One admission ticket.
///
/// `code` is the unique, case-sensitive identifier the operator scans.
/// `used_at` is set exactly once, when the status moves Sold -> Used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketRecord {
    /// Unique ticket code (e.g. "VIP-GALA-001").
    pub code: String,

    /// Category label (e.g. "VIP", "Regular", "Early", "Staff").
    pub category: String,

    /// Current status.
    pub status: TicketStatus,

    /// Local clock label of consumption, unset iff status != Used.
    #[serde(default, rename = "usedAt", with = "used_at_repr")]
    pub used_at: Option<String>,
}

impl TicketRecord {
    /// Create a record that has not been consumed.
    pub fn new(
        code: impl Into<String>,
        category: impl Into<String>,
        status: TicketStatus,
    ) -> Self {
        Self {
            code: code.into(),
            category: category.into(),
            status,
            used_at: None,
        }
    }

    /// Create an already-consumed record with its consumption time label.
    pub fn used(
        code: impl Into<String>,
        category: impl Into<String>,
        used_at: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            category: category.into(),
            status: TicketStatus::Used,
            used_at: Some(used_at.into()),
        }
    }
}

/// Formats a consumption timestamp the way the snapshot stores it,
/// e.g. `10:45 AM` or `09:30 AM` (2-digit 12-hour clock).
pub fn used_at_label(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

// ============================================================================
// Status Counts
// ============================================================================

/// Per-status record counts over the full registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub available: u64,
    pub sold: u64,
    pub used: u64,
}

impl StatusCounts {
    /// Total number of records counted.
    pub fn total(&self) -> u64 {
        self.available + self.sold + self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::Available).unwrap(),
            r#""available""#
        );
        assert_eq!(
            serde_json::to_string(&TicketStatus::Sold).unwrap(),
            r#""sold""#
        );
        assert_eq!(
            serde_json::to_string(&TicketStatus::Used).unwrap(),
            r#""used""#
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(TicketStatus::parse("sold"), Some(TicketStatus::Sold));
        assert_eq!(TicketStatus::parse("used"), Some(TicketStatus::Used));
        assert_eq!(
            TicketStatus::parse("available"),
            Some(TicketStatus::Available)
        );
        assert_eq!(TicketStatus::parse("Sold"), None);
        assert_eq!(TicketStatus::parse("expired"), None);
    }

    #[test]
    fn test_status_display_matches_wire_string() {
        assert_eq!(TicketStatus::Sold.to_string(), "sold");
        assert_eq!(TicketStatus::Used.as_str(), "used");
    }

    #[test]
    fn test_unused_record_serializes_dash() {
        let record = TicketRecord::new("VIP-GALA-001", "VIP", TicketStatus::Sold);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"code":"VIP-GALA-001","category":"VIP","status":"sold","usedAt":"-"}"#
        );
    }

    #[test]
    fn test_used_record_serializes_time_label() {
        let record = TicketRecord::used("EARLY-BIRD-1", "Early", "09:30 AM");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""usedAt":"09:30 AM""#));
        assert!(json.contains(r#""status":"used""#));
    }

    #[test]
    fn test_record_roundtrip() {
        let record = TicketRecord::used("VIP-GALA-003", "VIP", "10:45 AM");
        let json = serde_json::to_string(&record).unwrap();
        let back: TicketRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);

        let unused = TicketRecord::new("REG-FEST-056", "Regular", TicketStatus::Available);
        let json = serde_json::to_string(&unused).unwrap();
        let back: TicketRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unused);
        assert!(back.used_at.is_none());
    }

    #[test]
    fn test_dash_deserializes_to_none() {
        let json = r#"{"code":"X","category":"Regular","status":"sold","usedAt":"-"}"#;
        let record: TicketRecord = serde_json::from_str(json).unwrap();
        assert!(record.used_at.is_none());
    }

    #[test]
    fn test_used_at_label_format() {
        let morning = NaiveTime::from_hms_opt(10, 45, 0).unwrap();
        assert_eq!(used_at_label(morning), "10:45 AM");

        let early = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(used_at_label(early), "09:30 AM");

        let afternoon = NaiveTime::from_hms_opt(14, 5, 0).unwrap();
        assert_eq!(used_at_label(afternoon), "02:05 PM");
    }

    #[test]
    fn test_status_counts_total() {
        let counts = StatusCounts {
            available: 2,
            sold: 4,
            used: 2,
        };
        assert_eq!(counts.total(), 8);
        assert_eq!(StatusCounts::default().total(), 0);
    }
}
