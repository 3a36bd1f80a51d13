//! Common test utilities for E2E testing.
//!
//! This module provides a test fixture that creates an in-process server
//! wired to a real file-backed registry and audit store in a temp
//! directory, enabling comprehensive E2E testing without external
//! infrastructure.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use doorman_core::{
    create_audit_system, AuditStore, Config, DatabaseConfig, JsonFileRegistry, RegistryConfig,
    ScanState, ScannerConfig, ServerConfig, SqliteAuditStore, TicketRegistry,
};

use doorman_server::api::WsBroadcaster;

/// Test fixture for E2E testing against an in-process server.
///
/// The fixture seeds a ticket registry file in a temp directory and exposes
/// the underlying stores so tests can assert on state the API does not
/// expose directly.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_scan_submission() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post("/api/v1/scans", json!({ "code": "VIP-GALA-001" }))
///         .await;
///
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// File-backed registry seeded with the default dataset
    pub registry: Arc<JsonFileRegistry>,
    /// Audit store backing the audit endpoints
    pub audit_store: Arc<SqliteAuditStore>,
    /// Broadcaster wired to the scanner, for asserting WebSocket payloads
    pub ws_broadcaster: WsBroadcaster,
    /// Path of the registry file inside the temp directory
    pub registry_path: PathBuf,
    /// Temporary directory holding the registry file and audit database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with fast scanner delays.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let registry_path = temp_dir.path().join("tickets.json");
        let db_path = temp_dir.path().join("test.db");

        let scanner_config = ScannerConfig {
            processing_delay_ms: test_config.processing_delay_ms,
            dwell_ms: test_config.dwell_ms,
        };

        // Create config
        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            registry: RegistryConfig {
                path: registry_path.clone(),
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            scanner: scanner_config.clone(),
        };

        // Create stores
        let registry = Arc::new(
            JsonFileRegistry::new(&registry_path).expect("Failed to create ticket registry"),
        );
        let audit_store =
            Arc::new(SqliteAuditStore::new(&db_path).expect("Failed to create audit store"));

        // Create audit system
        let (audit_handle, audit_writer) =
            create_audit_system(Arc::clone(&audit_store) as Arc<dyn AuditStore>, 100);

        // Spawn audit writer
        tokio::spawn(audit_writer.run());

        // Create the scanner
        let scanner = Arc::new(doorman_core::TicketScanner::new(
            scanner_config,
            Arc::clone(&registry) as Arc<dyn TicketRegistry>,
            Some(audit_handle),
        ));

        // Create WebSocket broadcaster and forward scanner events to it,
        // mirroring the wiring in main
        let ws_broadcaster = WsBroadcaster::default();
        let forwarder_broadcaster = ws_broadcaster.clone();
        let forwarder_registry = Arc::clone(&registry);
        let mut scan_events = scanner.subscribe();
        tokio::spawn(async move {
            while let Ok(scan_state) = scan_events.recv().await {
                let consumed = matches!(scan_state, ScanState::Accepted { .. });
                forwarder_broadcaster.scan_update(scan_state);

                if consumed {
                    if let Ok(counts) = forwarder_registry.counts() {
                        forwarder_broadcaster.registry_update(counts);
                    }
                }
            }
        });

        // Create app state
        let state = Arc::new(doorman_server::state::AppState::new(
            config,
            Arc::clone(&registry) as Arc<dyn TicketRegistry>,
            scanner,
            Arc::clone(&audit_store) as Arc<dyn AuditStore>,
            ws_broadcaster.clone(),
        ));

        // Create router
        let router = doorman_server::api::create_router(state);

        Self {
            router,
            registry,
            audit_store,
            ws_broadcaster,
            registry_path,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a GET request and return the raw text body (for non-JSON endpoints).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Poll the scanner endpoint until it accepts submissions again.
    pub async fn wait_for_idle(&self) {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while std::time::Instant::now() < deadline {
            let response = self.get("/api/v1/scanner").await;
            if response.body["accepting"] == Value::Bool(true) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Scanner did not return to idle");
    }

    /// Poll the audit store until at least `expected` events are persisted.
    pub async fn wait_for_audit_events(&self, expected: i64) {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while std::time::Instant::now() < deadline {
            let count = self
                .audit_store
                .count(&doorman_core::AuditFilter::new())
                .expect("Failed to count audit events");
            if count >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Audit events were not persisted in time");
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Simulated processing delay in milliseconds
    pub processing_delay_ms: u64,
    /// Dwell time before the scanner returns to idle, in milliseconds
    pub dwell_ms: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: 20,
            dwell_ms: 30,
        }
    }
}

impl TestConfig {
    /// Config with delays long enough to observe the in-flight guard.
    pub fn with_slow_scans() -> Self {
        Self {
            processing_delay_ms: 200,
            dwell_ms: 400,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
