// crates/grafana-mcp-harness/src/session.rs
// ============================================================================
// Module: Session Handle
// Description: Owned handle over an initialized MCP client session.
// Purpose: Deterministic release of transport resources on every exit path.
// Dependencies: rmcp, serde_json, grafana-mcp-harness::transport
// ============================================================================

//! ## Overview
//! Wraps the running `rmcp` client service behind a handle that tests can
//! drive (`list_tools`, `call_tool`) and must release (`close`). Closing
//! cancels the service, which closes the transport: the stdio subprocess is
//! reaped and HTTP stream reads are cancelled. [`with_session`] is the
//! scoped form that guarantees release on success and failure alike.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rmcp::model::CallToolRequestParam;
use rmcp::model::CallToolResult;
use rmcp::model::ClientInfo;
use rmcp::model::Tool;
use rmcp::service::RoleClient;
use rmcp::service::RunningService;

use crate::env::EnvSnapshot;
use crate::error::HarnessError;
use crate::transport::TransportDescriptor;
use crate::transport::TransportKind;
use crate::transport::connect;

// ============================================================================
// SECTION: Session Handle
// ============================================================================

/// An initialized MCP session over one of the supported transports.
///
/// # Invariants
/// - The wrapped service has completed the initialize handshake.
/// - Ownership is released exactly once, through [`McpSession::close`].
pub struct McpSession {
    /// Transport the session was opened over.
    kind: TransportKind,
    /// Running client service owning the transport resources.
    service: RunningService<RoleClient, ClientInfo>,
}

impl std::fmt::Debug for McpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpSession").field("kind", &self.kind).finish_non_exhaustive()
    }
}

impl McpSession {
    /// Wraps an initialized client service.
    pub(crate) const fn new(
        kind: TransportKind,
        service: RunningService<RoleClient, ClientInfo>,
    ) -> Self {
        Self {
            kind,
            service,
        }
    }

    /// Returns the transport the session was opened over.
    #[must_use]
    pub const fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Lists the tools advertised by the server.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Request`] when the request fails.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, HarnessError> {
        let result = self
            .service
            .list_tools(Default::default())
            .await
            .map_err(|err| HarnessError::Request(err.to_string()))?;
        Ok(result.tools)
    }

    /// Invokes one tool with optional JSON-object arguments.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Request`] when the call fails.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<CallToolResult, HarnessError> {
        self.service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await
            .map_err(|err| HarnessError::Request(err.to_string()))
    }

    /// Releases the session: cancels the service and closes the transport.
    ///
    /// For the stdio transport this reaps the subprocess; for the HTTP
    /// transports it cancels in-flight stream reads.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Shutdown`] when cancellation fails.
    pub async fn close(self) -> Result<(), HarnessError> {
        let kind = self.kind;
        self.service
            .cancel()
            .await
            .map_err(|err| HarnessError::Shutdown(err.to_string()))?;
        tracing::debug!(transport = kind.as_str(), "MCP session closed");
        Ok(())
    }
}

// ============================================================================
// SECTION: Scoped Runner
// ============================================================================

/// Connects, runs `body`, and releases the session on every exit path.
///
/// Teardown runs whether `body` succeeds or fails; a body error takes
/// precedence over a teardown error in the returned result.
///
/// # Errors
///
/// Propagates connection errors from [`connect`], the body's error, or a
/// teardown failure after a successful body.
pub async fn with_session<T, F>(
    kind: TransportKind,
    snapshot: &EnvSnapshot,
    body: F,
) -> Result<T, HarnessError>
where
    F: AsyncFnOnce(&mut McpSession) -> Result<T, HarnessError>,
{
    let descriptor = TransportDescriptor::from_snapshot(kind, snapshot);
    let mut session = connect(descriptor).await?;
    let outcome = body(&mut session).await;
    let teardown = session.close().await;
    match outcome {
        Ok(value) => teardown.map(|()| value),
        Err(err) => {
            if let Err(shutdown) = teardown {
                tracing::warn!(error = %shutdown, "session teardown failed after body error");
            }
            Err(err)
        }
    }
}
