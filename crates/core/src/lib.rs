pub mod audit;
pub mod config;
pub mod metrics;
pub mod registry;
pub mod scanner;
pub mod testing;

pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditFilter, AuditHandle, AuditRecord, AuditStats,
    AuditStore, AuditWriter, SqliteAuditStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    RegistryConfig, ServerConfig,
};
pub use registry::{
    seed_records, JsonFileRegistry, RegistryError, SnapshotFilter, StatusCounts, TicketRecord,
    TicketRegistry, TicketStatus,
};
pub use scanner::{Decision, ScanError, ScanState, ScannerConfig, TicketScanner};
