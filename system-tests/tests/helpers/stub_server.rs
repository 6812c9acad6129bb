// system-tests/tests/helpers/stub_server.rs
// ============================================================================
// Module: Stub Server Helpers
// Description: Loopback HTTP stubs hosting the stub MCP server.
// Purpose: Give suites live SSE and streamable-HTTP endpoints to connect to.
// Dependencies: system-tests, axum, rmcp, tokio
// ============================================================================

//! ## Overview
//! Spawns the stub MCP server behind the two HTTP transports on loopback
//! ports. The streamable-HTTP stub records every request's headers so
//! suites can assert the credential headers the harness actually sent;
//! header names are recorded lowercased, as the HTTP layer normalizes them.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use axum::Router;
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::middleware;
use axum::middleware::Next;
use axum::response::Response;
use rmcp::transport::sse_server::SseServer;
use rmcp::transport::streamable_http_server::StreamableHttpServerConfig;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use system_tests::stub::StubGrafanaServer;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

// ============================================================================
// SECTION: Header Capture
// ============================================================================

/// Shared log of request headers seen by a stub.
#[derive(Debug, Clone, Default)]
pub struct HeaderLog {
    /// One entry per request, in arrival order.
    entries: Arc<Mutex<Vec<BTreeMap<String, String>>>>,
}

impl HeaderLog {
    /// Records one request's headers; non-UTF-8 values are skipped.
    fn record(&self, headers: &HeaderMap) {
        let entry: BTreeMap<String, String> = headers
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }

    /// Returns all recorded entries.
    pub fn snapshot(&self) -> Vec<BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the named header from the first recorded request, if any.
    pub fn first_value(&self, name: &str) -> Option<String> {
        self.snapshot().first().and_then(|entry| entry.get(name).cloned())
    }
}

/// Middleware recording request headers before handing off to the stub.
async fn record_headers(State(log): State<HeaderLog>, request: Request, next: Next) -> Response {
    log.record(request.headers());
    next.run(request).await
}

// ============================================================================
// SECTION: Streamable HTTP Stub
// ============================================================================

/// A running streamable-HTTP stub with header capture.
pub struct StreamableHttpStub {
    /// Bound loopback address.
    pub addr: SocketAddr,
    /// Base URL (no endpoint path).
    pub base_url: String,
    /// Headers recorded from every request.
    pub headers: HeaderLog,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Spawns the stub MCP server behind a streamable-HTTP endpoint at `/mcp`.
pub async fn spawn_streamable_http_stub() -> Result<StreamableHttpStub, String> {
    let headers = HeaderLog::default();
    let service: StreamableHttpService<StubGrafanaServer, LocalSessionManager> =
        StreamableHttpService::new(
            || Ok(StubGrafanaServer::new()),
            Default::default(),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: None,
                ..Default::default()
            },
        );
    let app = Router::new()
        .nest_service("/mcp", service)
        .layer(middleware::from_fn_with_state(headers.clone(), record_headers));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("failed to bind stub listener: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("failed to read stub addr: {err}"))?;
    let (shutdown, shutdown_rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });
    Ok(StreamableHttpStub {
        addr,
        base_url: format!("http://{addr}"),
        headers,
        shutdown,
        task,
    })
}

impl StreamableHttpStub {
    /// Stops the stub and waits for its server task.
    pub async fn shutdown(self) -> Result<(), String> {
        let _ = self.shutdown.send(());
        self.task.await.map_err(|err| format!("stub server task failed: {err}"))
    }
}

// ============================================================================
// SECTION: SSE Stub
// ============================================================================

/// A running SSE stub.
pub struct SseStub {
    /// Bound loopback address.
    pub addr: SocketAddr,
    /// Base URL (no endpoint path).
    pub base_url: String,
    cancel: CancellationToken,
}

/// Spawns the stub MCP server behind an SSE endpoint at `/sse`.
pub async fn spawn_sse_stub() -> Result<SseStub, String> {
    // Probe a free loopback port; SseServer binds the address itself.
    let probe = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("failed to probe a free port: {err}"))?;
    let addr = probe.local_addr().map_err(|err| format!("failed to read probe addr: {err}"))?;
    drop(probe);
    let server = SseServer::serve(addr)
        .await
        .map_err(|err| format!("failed to start sse stub: {err}"))?;
    let cancel = server.with_service(StubGrafanaServer::new);
    Ok(SseStub {
        addr,
        base_url: format!("http://{addr}"),
        cancel,
    })
}

impl SseStub {
    /// Stops the stub.
    pub fn shutdown(self) {
        self.cancel.cancel();
    }
}
