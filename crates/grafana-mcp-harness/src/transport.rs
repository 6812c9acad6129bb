// crates/grafana-mcp-harness/src/transport.rs
// ============================================================================
// Module: Transport Selector
// Description: Transport descriptors and session construction for MCP tests.
// Purpose: Build exactly one of three duplex channels and initialize it.
// Dependencies: rmcp, reqwest, tokio, grafana-mcp-harness::credentials
// ============================================================================

//! ## Overview
//! The transport surface is a closed tagged union: `stdio` (subprocess
//! pipe), `sse` (event stream), and `streamable-http` (chunked HTTP
//! stream). Descriptor construction is a pure function of the environment
//! snapshot and is unit-testable without I/O; [`connect`] is the only
//! function here that touches the network or spawns processes. Adding or
//! removing a transport is a compile-time-checked change.
//!
//! Session framing, request correlation, and the initialize handshake are
//! delegated to the `rmcp` client library; this module only assembles
//! correctly-configured channels for it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use rmcp::ServiceExt;
use rmcp::model::ClientCapabilities;
use rmcp::model::ClientInfo;
use rmcp::model::Implementation;
use rmcp::transport::ConfigureCommandExt;
use rmcp::transport::SseClientTransport;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::transport::TokioChildProcess;
use rmcp::transport::sse_client::SseClientConfig;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use tokio::process::Command;

use crate::credentials;
use crate::env::EnvSnapshot;
use crate::error::HarnessError;
use crate::session::McpSession;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed debug flags passed to the stdio MCP server executable.
pub const STDIO_SERVER_ARGS: &[&str] = &["--debug", "--log-level", "debug"];

/// Endpoint path for the event-stream transport.
pub const SSE_ENDPOINT_PATH: &str = "/sse";

/// Endpoint path for the chunked HTTP transport.
pub const STREAMABLE_HTTP_ENDPOINT_PATH: &str = "/mcp";

// ============================================================================
// SECTION: Transport Kind
// ============================================================================

/// The three supported transport selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Subprocess pipe over the server's stdin/stdout.
    Stdio,
    /// Long-lived server-sent-event stream.
    Sse,
    /// Chunked bidirectional HTTP stream.
    StreamableHttp,
}

impl TransportKind {
    /// Returns the canonical selector value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable-http",
        }
    }

    /// Reads the selector from a snapshot's `MCP_TRANSPORT` value.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnsupportedTransport`] for any value outside
    /// the supported set.
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self, HarnessError> {
        snapshot.transport_value().parse()
    }
}

impl FromStr for TransportKind {
    type Err = HarnessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "streamable-http" => Ok(Self::StreamableHttp),
            other => Err(HarnessError::UnsupportedTransport(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Transport Descriptor
// ============================================================================

/// Fully-resolved connection parameters for one transport.
///
/// # Invariants
/// - Construction performs no I/O and creates no resources.
/// - `Sse` and `StreamableHttp` URLs already include their endpoint paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportDescriptor {
    /// Launch a subprocess and pipe MCP over its stdin/stdout.
    Stdio {
        /// Server executable path.
        command: PathBuf,
        /// Fixed debug arguments.
        args: Vec<String>,
        /// Credential bundle layered over the inherited environment.
        env: BTreeMap<String, String>,
    },
    /// Open an event-stream connection.
    Sse {
        /// Full SSE endpoint URL.
        url: String,
        /// Credential headers attached to every request.
        headers: BTreeMap<String, String>,
    },
    /// Open a chunked bidirectional HTTP stream.
    StreamableHttp {
        /// Full streamable-HTTP endpoint URL.
        url: String,
        /// Credential headers attached to every request.
        headers: BTreeMap<String, String>,
    },
}

impl TransportDescriptor {
    /// Builds the descriptor for `kind` from a snapshot.
    ///
    /// Pure: resolves credentials into the encoding the transport needs and
    /// computes the endpoint, without creating any resource.
    #[must_use]
    pub fn from_snapshot(kind: TransportKind, snapshot: &EnvSnapshot) -> Self {
        match kind {
            TransportKind::Stdio => Self::Stdio {
                command: PathBuf::from(snapshot.mcp_server_path()),
                args: STDIO_SERVER_ARGS.iter().map(ToString::to_string).collect(),
                env: credentials::resolve_as_env(snapshot),
            },
            TransportKind::Sse => Self::Sse {
                url: endpoint_url(snapshot.mcp_url(), SSE_ENDPOINT_PATH),
                headers: credentials::resolve_as_headers(snapshot),
            },
            TransportKind::StreamableHttp => Self::StreamableHttp {
                url: endpoint_url(snapshot.mcp_url(), STREAMABLE_HTTP_ENDPOINT_PATH),
                headers: credentials::resolve_as_headers(snapshot),
            },
        }
    }

    /// Returns the descriptor's transport kind.
    #[must_use]
    pub const fn kind(&self) -> TransportKind {
        match self {
            Self::Stdio {
                ..
            } => TransportKind::Stdio,
            Self::Sse {
                ..
            } => TransportKind::Sse,
            Self::StreamableHttp {
                ..
            } => TransportKind::StreamableHttp,
        }
    }

    /// Returns the endpoint URL for the HTTP-based transports.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Stdio {
                ..
            } => None,
            Self::Sse {
                url, ..
            }
            | Self::StreamableHttp {
                url, ..
            } => Some(url),
        }
    }

    /// Returns the header bundle for the HTTP-based transports.
    #[must_use]
    pub const fn headers(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Stdio {
                ..
            } => None,
            Self::Sse {
                headers, ..
            }
            | Self::StreamableHttp {
                headers, ..
            } => Some(headers),
        }
    }
}

/// Joins a base URL and an endpoint path without doubling slashes.
fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

// ============================================================================
// SECTION: Connection
// ============================================================================

/// Opens the described channel and performs the MCP initialize handshake.
///
/// Suspends while the channel and handshake complete; on success the
/// returned session is fully initialized. The caller owns the session and
/// must release it on every exit path, normally through
/// [`crate::session::with_session`].
///
/// # Errors
///
/// Returns [`HarnessError::Spawn`] when the stdio subprocess cannot be
/// launched, [`HarnessError::Connect`] when an HTTP channel cannot be
/// opened, and [`HarnessError::Handshake`] when initialization fails on an
/// open channel. Configuration errors are raised by descriptor construction
/// before this function runs.
pub async fn connect(descriptor: TransportDescriptor) -> Result<McpSession, HarnessError> {
    let kind = descriptor.kind();
    tracing::debug!(transport = kind.as_str(), "connecting MCP session");
    let service = match descriptor {
        TransportDescriptor::Stdio {
            command,
            args,
            env,
        } => {
            let transport = TokioChildProcess::new(Command::new(&command).configure(|cmd| {
                for arg in &args {
                    cmd.arg(arg);
                }
                cmd.envs(&env);
            }))
            .map_err(|err| HarnessError::Spawn(err.to_string()))?;
            client_info()
                .serve(transport)
                .await
                .map_err(|err| HarnessError::Handshake(err.to_string()))?
        }
        TransportDescriptor::Sse {
            url,
            headers,
        } => {
            let client = http_client(&headers)?;
            let transport = SseClientTransport::start_with_client(
                client,
                SseClientConfig {
                    sse_endpoint: url.into(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|err| HarnessError::Connect(err.to_string()))?;
            client_info()
                .serve(transport)
                .await
                .map_err(|err| HarnessError::Handshake(err.to_string()))?
        }
        TransportDescriptor::StreamableHttp {
            url,
            headers,
        } => {
            let client = http_client(&headers)?;
            let transport = StreamableHttpClientTransport::with_client(
                client,
                StreamableHttpClientTransportConfig::with_uri(url),
            );
            client_info()
                .serve(transport)
                .await
                .map_err(|err| HarnessError::Handshake(err.to_string()))?
        }
    };
    tracing::debug!(transport = kind.as_str(), "MCP session initialized");
    Ok(McpSession::new(kind, service))
}

/// Identity presented during the initialize handshake.
fn client_info() -> ClientInfo {
    ClientInfo {
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation::from_build_env(),
    }
}

/// Builds an HTTP client that attaches the header bundle to every request.
fn http_client(headers: &BTreeMap<String, String>) -> Result<reqwest::Client, HarnessError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| HarnessError::InvalidHeader {
                name: name.clone(),
                reason: err.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|err| HarnessError::InvalidHeader {
                name: name.clone(),
                reason: err.to_string(),
            })?;
        map.insert(header_name, header_value);
    }
    reqwest::Client::builder()
        .default_headers(map)
        .build()
        .map_err(|err| HarnessError::Connect(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
