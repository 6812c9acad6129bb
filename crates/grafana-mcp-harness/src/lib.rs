// crates/grafana-mcp-harness/src/lib.rs
// ============================================================================
// Module: Grafana MCP Harness
// Description: Test-harness bootstrap layer for a Grafana-fronting MCP server.
// Purpose: Credential resolution, transport selection, lifecycle cleanup.
// Dependencies: rmcp, reqwest, tokio, base64, thiserror, tracing
// ============================================================================

//! ## Overview
//! Bootstrap layer for system tests that exercise a remote MCP tool server
//! fronting a Grafana backend over three alternative transports. The crate
//! does three things and nothing else:
//!
//! - **Credential resolution** ([`credentials`]): one of three mutually
//!   exclusive authentication schemes resolved from an environment
//!   snapshot into either an HTTP header bundle or a child-process
//!   environment bundle.
//! - **Transport selection** ([`transport`], [`session`]): a closed union
//!   of stdio, SSE, and streamable-HTTP descriptors, connected through the
//!   `rmcp` client into an owned session handle with deterministic
//!   teardown.
//! - **Lifecycle cleanup** ([`lifecycle`], [`telemetry`]): boundary hooks
//!   resetting an injected telemetry worker, plus a narrow report filter
//!   for one benign teardown fault.
//!
//! The MCP wire protocol itself is consumed from `rmcp`, never
//! reimplemented here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod credentials;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod session;
pub mod telemetry;
pub mod transport;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use credentials::Credentials;
pub use credentials::Deprecation;
pub use credentials::ResolvedCredentials;
pub use env::EnvSnapshot;
pub use env::HarnessEnv;
pub use error::HarnessError;
pub use lifecycle::FaultOrigin;
pub use lifecycle::LifecycleGuard;
pub use lifecycle::TaskFault;
pub use lifecycle::TestOutcome;
pub use lifecycle::TestReport;
pub use session::McpSession;
pub use session::with_session;
pub use telemetry::TelemetryWorkerHandle;
pub use transport::TransportDescriptor;
pub use transport::TransportKind;
pub use transport::connect;
