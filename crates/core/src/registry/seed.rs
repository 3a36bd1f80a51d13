//! Default dataset for a fresh registry.

use super::types::{TicketRecord, TicketStatus};

/// Records a brand-new registry file is seeded with.
///
/// The mix covers every status so the gate can be exercised immediately:
/// sold tickets admit, used and available ones deny.
pub fn seed_records() -> Vec<TicketRecord> {
    vec![
        TicketRecord::new("VIP-GALA-001", "VIP", TicketStatus::Sold),
        TicketRecord::new("VIP-GALA-002", "VIP", TicketStatus::Sold),
        TicketRecord::used("VIP-GALA-003", "VIP", "10:45 AM"),
        TicketRecord::new("REG-FEST-055", "Regular", TicketStatus::Sold),
        TicketRecord::new("REG-FEST-056", "Regular", TicketStatus::Available),
        TicketRecord::new("REG-FEST-057", "Regular", TicketStatus::Available),
        TicketRecord::used("EARLY-BIRD-1", "Early", "09:30 AM"),
        TicketRecord::new("STAFF-ACC-01", "Staff", TicketStatus::Sold),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_codes_are_unique() {
        let records = seed_records();
        let codes: HashSet<_> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes.len(), records.len());
    }

    #[test]
    fn test_seed_covers_every_status() {
        let records = seed_records();
        assert!(records.iter().any(|r| r.status == TicketStatus::Available));
        assert!(records.iter().any(|r| r.status == TicketStatus::Sold));
        assert!(records.iter().any(|r| r.status == TicketStatus::Used));
    }

    #[test]
    fn test_used_seeds_carry_a_time_label() {
        for record in seed_records() {
            if record.status == TicketStatus::Used {
                assert!(record.used_at.is_some(), "{} missing used_at", record.code);
            } else {
                assert!(record.used_at.is_none(), "{} has stray used_at", record.code);
            }
        }
    }
}
