// crates/grafana-mcp-harness/src/env.rs
// ============================================================================
// Module: Environment Snapshot
// Description: Immutable capture of the harness environment variables.
// Purpose: Centralize env parsing with strict UTF-8 validation and defaults.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The harness reads its configuration from ambient environment variables
//! exactly once per test setup. The captured snapshot is immutable; every
//! downstream component (credential resolver, transport selector) is a pure
//! function of it. Invalid UTF-8 fails closed rather than being lossily
//! converted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default Grafana backend URL when `GRAFANA_URL` is absent.
pub const DEFAULT_GRAFANA_URL: &str = "http://localhost:3000";

/// Default MCP server URL for non-stdio transports when `MCP_GRAFANA_URL`
/// is absent.
pub const DEFAULT_MCP_URL: &str = "http://localhost:8000";

/// Default transport selector when `MCP_TRANSPORT` is absent.
pub const DEFAULT_MCP_TRANSPORT: &str = "sse";

/// Default MCP server executable for the stdio transport, relative to the
/// test working directory (a sibling build artifact).
pub const DEFAULT_MCP_SERVER_PATH: &str = "../dist/mcp-grafana";

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment variables consumed by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HarnessEnv {
    /// Grafana backend base URL, forwarded in both encodings.
    GrafanaUrl,
    /// Modern service-account token credential.
    ServiceAccountToken,
    /// Legacy API key credential (deprecated).
    ApiKey,
    /// Basic-auth username; only effective together with the password.
    Username,
    /// Basic-auth password; only effective together with the username.
    Password,
    /// Transport selector: `stdio`, `sse`, or `streamable-http`.
    Transport,
    /// MCP server URL used by the `sse` and `streamable-http` transports.
    McpUrl,
    /// Executable path override for the `stdio` transport.
    McpServerPath,
}

impl HarnessEnv {
    /// All variables read during snapshot capture.
    pub const ALL: &'static [Self] = &[
        Self::GrafanaUrl,
        Self::ServiceAccountToken,
        Self::ApiKey,
        Self::Username,
        Self::Password,
        Self::Transport,
        Self::McpUrl,
        Self::McpServerPath,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GrafanaUrl => "GRAFANA_URL",
            Self::ServiceAccountToken => "GRAFANA_SERVICE_ACCOUNT_TOKEN",
            Self::ApiKey => "GRAFANA_API_KEY",
            Self::Username => "GRAFANA_USERNAME",
            Self::Password => "GRAFANA_PASSWORD",
            Self::Transport => "MCP_TRANSPORT",
            Self::McpUrl => "MCP_GRAFANA_URL",
            Self::McpServerPath => "MCP_GRAFANA_PATH",
        }
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Immutable mapping of harness environment variables to their values.
///
/// # Invariants
/// - Captured once per test setup; never mutated afterwards.
/// - Holds only variables listed in [`HarnessEnv::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    /// Captured variable values keyed by canonical name.
    values: BTreeMap<&'static str, String>,
}

impl EnvSnapshot {
    /// Captures the harness variables from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidEnvVar`] when a harness variable is
    /// set but holds non-UTF-8 data.
    pub fn capture() -> Result<Self, HarnessError> {
        let mut values = BTreeMap::new();
        for key in HarnessEnv::ALL {
            let name = key.as_str();
            if let Some(raw) = std::env::var_os(name) {
                let value = raw.into_string().map_err(|_| HarnessError::InvalidEnvVar {
                    name: name.to_string(),
                })?;
                values.insert(name, value);
            }
        }
        Ok(Self {
            values,
        })
    }

    /// Builds a snapshot from explicit pairs; used by tests and embedders
    /// that configure the harness without touching the process environment.
    pub fn from_pairs<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (HarnessEnv, V)>,
        V: Into<String>,
    {
        let values =
            pairs.into_iter().map(|(key, value)| (key.as_str(), value.into())).collect();
        Self {
            values,
        }
    }

    /// Returns the captured value for a variable, if present.
    #[must_use]
    pub fn get(&self, key: HarnessEnv) -> Option<&str> {
        self.values.get(key.as_str()).map(String::as_str)
    }

    /// Returns the Grafana backend URL, falling back to the default.
    #[must_use]
    pub fn grafana_url(&self) -> &str {
        self.get(HarnessEnv::GrafanaUrl).unwrap_or(DEFAULT_GRAFANA_URL)
    }

    /// Returns the MCP server URL, falling back to the default.
    #[must_use]
    pub fn mcp_url(&self) -> &str {
        self.get(HarnessEnv::McpUrl).unwrap_or(DEFAULT_MCP_URL)
    }

    /// Returns the raw transport selector, falling back to the default.
    #[must_use]
    pub fn transport_value(&self) -> &str {
        self.get(HarnessEnv::Transport).unwrap_or(DEFAULT_MCP_TRANSPORT)
    }

    /// Returns the MCP server executable path, falling back to the default.
    #[must_use]
    pub fn mcp_server_path(&self) -> &str {
        self.get(HarnessEnv::McpServerPath).unwrap_or(DEFAULT_MCP_SERVER_PATH)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
