// crates/grafana-mcp-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy for session bootstrap and teardown.
// Purpose: Separate configuration errors from transport and shutdown failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Configuration errors (`UnsupportedTransport`, `InvalidHeader`,
//! `InvalidEnvVar`) are raised before any subprocess or socket exists.
//! Transport and handshake failures wrap the collaborator's error text and
//! propagate unchanged to the caller. Nothing in this taxonomy is recovered
//! silently; the lifecycle guard's narrow fault suppression lives in
//! `crate::lifecycle`, not here.

use thiserror::Error;

/// Errors raised while assembling or releasing an MCP test session.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The transport selector value is outside the supported set.
    #[error("unsupported transport: {0}")]
    UnsupportedTransport(String),

    /// A resolved header name or value cannot be encoded on the wire.
    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader {
        /// Header name as resolved from the credential bundle.
        name: String,
        /// Why the header was rejected by the HTTP layer.
        reason: String,
    },

    /// An environment variable holds non-UTF-8 data.
    #[error("environment variable {name} must be valid UTF-8")]
    InvalidEnvVar {
        /// Name of the offending variable.
        name: String,
    },

    /// The MCP server subprocess could not be launched.
    #[error("failed to spawn MCP server process: {0}")]
    Spawn(String),

    /// The transport channel could not be opened.
    #[error("failed to open transport connection: {0}")]
    Connect(String),

    /// The MCP initialize handshake failed after the channel opened.
    #[error("initialize handshake failed: {0}")]
    Handshake(String),

    /// A request issued on an initialized session failed.
    #[error("session request failed: {0}")]
    Request(String),

    /// Session teardown did not complete cleanly.
    #[error("session shutdown failed: {0}")]
    Shutdown(String),
}

impl HarnessError {
    /// Returns true for errors caused by configuration rather than I/O.
    ///
    /// Configuration errors are guaranteed to be raised before any
    /// subprocess or socket has been created.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedTransport(_) | Self::InvalidHeader { .. } | Self::InvalidEnvVar { .. }
        )
    }
}
