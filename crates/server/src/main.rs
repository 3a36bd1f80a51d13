use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doorman_core::{
    create_audit_system, load_config, validate_config, AuditEvent, AuditStore, JsonFileRegistry,
    ScanState, SqliteAuditStore, TicketRegistry, TicketScanner,
};

use doorman_server::api::{create_router, WsBroadcaster};
use doorman_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

/// Interval between WebSocket heartbeats
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("DOORMAN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("doorman.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Registry path: {:?}", config.registry.path);
    info!("Database path: {:?}", config.database.path);

    // Compute config hash for audit
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    // Open the ticket registry (seeds the file on first run)
    let registry: Arc<dyn TicketRegistry> = Arc::new(
        JsonFileRegistry::new(&config.registry.path).context("Failed to open ticket registry")?,
    );
    info!("Ticket registry initialized");

    // Create SQLite audit store
    let audit_store: Arc<dyn AuditStore> = Arc::new(
        SqliteAuditStore::new(&config.database.path).context("Failed to create audit store")?,
    );
    info!("Audit store initialized");

    // Create audit system
    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);

    // Spawn audit writer task
    let writer_handle = tokio::spawn(audit_writer.run());

    // Emit ServiceStarted event
    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;
    info!("Emitted ServiceStarted audit event");

    // Create the scanner
    let scanner = Arc::new(TicketScanner::new(
        config.scanner.clone(),
        Arc::clone(&registry),
        Some(audit_handle.clone()),
    ));
    info!(
        "Scanner initialized (processing {}ms, dwell {}ms)",
        config.scanner.processing_delay_ms, config.scanner.dwell_ms
    );

    // Create WebSocket broadcaster for real-time updates
    let ws_broadcaster = WsBroadcaster::default();
    info!("WebSocket broadcaster initialized");

    // Forward scanner state changes to WebSocket clients. A grant changes the
    // registry, so fresh counts are broadcast right after the accepted state.
    let forwarder_broadcaster = ws_broadcaster.clone();
    let forwarder_registry = Arc::clone(&registry);
    let mut scan_events = scanner.subscribe();
    tokio::spawn(async move {
        loop {
            match scan_events.recv().await {
                Ok(scan_state) => {
                    let consumed = matches!(scan_state, ScanState::Accepted { .. });
                    forwarder_broadcaster.scan_update(scan_state);

                    if consumed {
                        match forwarder_registry.counts() {
                            Ok(counts) => forwarder_broadcaster.registry_update(counts),
                            Err(e) => error!("Failed to read registry counts: {}", e),
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Scan event forwarder lagged, skipped {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Periodic heartbeat so clients can detect a dead connection
    let heartbeat_broadcaster = ws_broadcaster.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        loop {
            interval.tick().await;
            heartbeat_broadcaster.heartbeat();
        }
    });

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        registry,
        Arc::clone(&scanner),
        audit_store,
        ws_broadcaster,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Emit ServiceStopped event
    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // Drop all holders of AuditHandle so the writer's channel closes.
    // The scanner holds an AuditHandle clone, so we must drop it.
    // Order matters: the final event is emitted BEFORE dropping handles.
    drop(scanner);
    drop(audit_handle);

    // Wait for writer to finish processing remaining events
    let _ = writer_handle.await;
    info!("Audit writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
