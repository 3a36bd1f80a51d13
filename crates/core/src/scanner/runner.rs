//! The scanner state machine.
//!
//! `TicketScanner` owns the scan lifecycle: a submitted code enters
//! Processing, resolves to Accepted or Denied against the registry, dwells
//! so the operator can read the verdict, and returns to Idle. One scan is
//! in flight at a time; submissions during the window are rejected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::audit::{AuditEvent, AuditHandle};
use crate::metrics::{SCANS_SUBMITTED, SCAN_DECISIONS, SCAN_DENIALS};
use crate::registry::{RegistryError, TicketRecord, TicketRegistry, TicketStatus};

use super::config::ScannerConfig;
use super::types::{Decision, ScanError, ScanState};

/// Capacity of the state transition broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Drives submitted ticket codes through the scan lifecycle.
pub struct TicketScanner {
    config: ScannerConfig,
    registry: Arc<dyn TicketRegistry>,
    audit: Option<AuditHandle>,
    state: Arc<Mutex<ScanState>>,
    in_flight: Arc<AtomicBool>,
    events_tx: broadcast::Sender<ScanState>,
}

impl TicketScanner {
    /// Create a new scanner over the given registry.
    pub fn new(
        config: ScannerConfig,
        registry: Arc<dyn TicketRegistry>,
        audit: Option<AuditHandle>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            registry,
            audit,
            state: Arc::new(Mutex::new(ScanState::Idle)),
            in_flight: Arc::new(AtomicBool::new(false)),
            events_tx,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScanState {
        self.state.lock().unwrap().clone()
    }

    /// Whether a submission right now would be accepted
    pub fn is_accepting(&self) -> bool {
        !self.in_flight.load(Ordering::SeqCst)
    }

    /// Subscribe to state transitions.
    ///
    /// Every transition the scanner makes (including the return to Idle)
    /// is sent to all subscribers.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanState> {
        self.events_tx.subscribe()
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Submit a ticket code for validation.
    ///
    /// Validation and the re-entrancy check happen synchronously; the
    /// returned state is the Processing state the scanner just entered.
    /// The verdict is announced via `subscribe()` after the processing
    /// delay, and the scanner returns to Idle after the dwell.
    pub fn submit(&self, code: &str) -> Result<ScanState, ScanError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ScanError::EmptyInput);
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("Scan of {} rejected, another scan is in flight", code);
            return Err(ScanError::ScanInFlight);
        }

        SCANS_SUBMITTED.inc();
        info!("Scan submitted for code {}", code);

        let processing = ScanState::Processing {
            code: code.to_string(),
        };
        Self::publish(&self.state, &self.events_tx, processing.clone());

        if let Some(ref audit_handle) = self.audit {
            audit_handle.try_emit(AuditEvent::ScanSubmitted {
                code: code.to_string(),
            });
        }

        let code = code.to_string();
        let config = self.config.clone();
        let registry = Arc::clone(&self.registry);
        let audit = self.audit.clone();
        let state = Arc::clone(&self.state);
        let in_flight = Arc::clone(&self.in_flight);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            Self::run_scan(code, config, registry, audit, state, in_flight, events_tx).await;
        });

        Ok(processing)
    }

    /// Resolve a code against the registry and produce the verdict.
    ///
    /// A Sold ticket is marked used (persisted) before the granted decision
    /// is returned; every other case denies without mutating the registry.
    pub fn resolve(registry: &dyn TicketRegistry, code: &str) -> Decision {
        Self::decide(registry, code).0
    }

    fn decide(registry: &dyn TicketRegistry, code: &str) -> (Decision, Option<TicketRecord>) {
        let found = match registry.find_by_code(code) {
            Ok(found) => found,
            Err(e) => {
                error!("Registry lookup failed for code {}: {}", code, e);
                SCAN_DENIALS.with_label_values(&["registry_error"]).inc();
                return (Decision::denied("Ticket registry unavailable."), None);
            }
        };

        let record = match found {
            Some(record) => record,
            None => {
                SCAN_DENIALS.with_label_values(&["not_found"]).inc();
                return (Decision::denied("Ticket code not found in system."), None);
            }
        };

        match record.status {
            TicketStatus::Sold => match registry.mark_used(code) {
                Ok(updated) => {
                    let message = format!("Welcome! {} ticket accepted.", updated.category);
                    (Decision::granted(message), Some(updated))
                }
                Err(RegistryError::InvalidTransition { .. }) => {
                    // Status changed between the lookup and the write
                    warn!("Ticket {} changed status mid-scan, denying entry", code);
                    SCAN_DENIALS.with_label_values(&["race"]).inc();
                    (Decision::denied("Ticket already used."), Some(record))
                }
                Err(e) => {
                    error!("Failed to mark ticket {} used: {}", code, e);
                    SCAN_DENIALS.with_label_values(&["registry_error"]).inc();
                    (
                        Decision::denied("Ticket registry unavailable."),
                        Some(record),
                    )
                }
            },
            TicketStatus::Used => {
                SCAN_DENIALS.with_label_values(&["already_used"]).inc();
                let message = match record.used_at {
                    Some(ref at) => format!("Ticket already used at {}.", at),
                    None => "Ticket already used.".to_string(),
                };
                (Decision::denied(message), Some(record))
            }
            TicketStatus::Available => {
                SCAN_DENIALS.with_label_values(&["not_activated"]).inc();
                (
                    Decision::denied("Ticket not yet activated/sold."),
                    Some(record),
                )
            }
        }
    }

    async fn run_scan(
        code: String,
        config: ScannerConfig,
        registry: Arc<dyn TicketRegistry>,
        audit: Option<AuditHandle>,
        state: Arc<Mutex<ScanState>>,
        in_flight: Arc<AtomicBool>,
        events_tx: broadcast::Sender<ScanState>,
    ) {
        tokio::time::sleep(Duration::from_millis(config.processing_delay_ms)).await;

        let (decision, record) = Self::decide(registry.as_ref(), &code);

        if decision.success {
            SCAN_DECISIONS.with_label_values(&["granted"]).inc();
            info!("Access granted for code {}", code);
        } else {
            SCAN_DECISIONS.with_label_values(&["denied"]).inc();
            info!("Access denied for code {}: {}", code, decision.message);
        }

        if let Some(ref audit_handle) = audit {
            let event = if decision.success {
                AuditEvent::AccessGranted {
                    code: code.clone(),
                    category: record
                        .as_ref()
                        .map(|r| r.category.clone())
                        .unwrap_or_default(),
                }
            } else {
                AuditEvent::AccessDenied {
                    code: code.clone(),
                    reason: decision.message.clone(),
                }
            };
            audit_handle.emit(event).await;
        }

        let verdict = if decision.success {
            ScanState::Accepted { decision }
        } else {
            ScanState::Denied { decision }
        };
        Self::publish(&state, &events_tx, verdict);

        tokio::time::sleep(Duration::from_millis(config.dwell_ms)).await;

        // Idle is published before the guard clears so a submission never
        // observes accepting == true with a stale decision state
        Self::publish(&state, &events_tx, ScanState::Idle);
        in_flight.store(false, Ordering::SeqCst);
    }

    fn publish(
        state: &Arc<Mutex<ScanState>>,
        events_tx: &broadcast::Sender<ScanState>,
        next: ScanState,
    ) {
        *state.lock().unwrap() = next.clone();
        // Ignore send errors - they just mean no one is listening
        let _ = events_tx.send(next);
    }
}
