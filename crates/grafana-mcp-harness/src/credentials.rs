// crates/grafana-mcp-harness/src/credentials.rs
// ============================================================================
// Module: Credential Resolver
// Description: Precedence-ordered Grafana credential resolution.
// Purpose: Shape ambient credentials into header or process-env bundles.
// Dependencies: base64, tracing
// ============================================================================

//! ## Overview
//! Resolves at most one authentication scheme from an environment snapshot,
//! following a fixed precedence chain: service-account token, then the
//! deprecated API key, then basic-auth username/password, else anonymous.
//! The resolved credentials encode into exactly two wire shapes: a header
//! bundle for HTTP transports and a process-environment bundle for the
//! stdio transport. Resolution is a pure function of the snapshot; the only
//! observable side effect is one deprecation warning when the legacy key is
//! selected.
//!
//! Security posture: bundles hold secrets; neither encoding is logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;

use crate::env::EnvSnapshot;
use crate::env::HarnessEnv;

// ============================================================================
// SECTION: Header Names
// ============================================================================

/// Custom header carrying the Grafana backend URL.
pub const HEADER_GRAFANA_URL: &str = "X-Grafana-URL";

/// Custom header carrying either credential token form.
pub const HEADER_GRAFANA_API_KEY: &str = "X-Grafana-API-Key";

/// Standard HTTP authorization header, used for basic auth.
pub const HEADER_AUTHORIZATION: &str = "Authorization";

// ============================================================================
// SECTION: Credential Cases
// ============================================================================

/// Resolved authentication material with exactly one active case.
///
/// # Invariants
/// - At most one case is populated per snapshot.
/// - `ApiKey` and `ServiceAccountToken` share a wire value in the header
///   encoding; only the deprecation signal distinguishes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Modern service-account token.
    ServiceAccountToken(String),
    /// Legacy API key; selecting it raises a deprecation notice.
    ApiKey(String),
    /// Basic authentication pair.
    Basic {
        /// Grafana username.
        username: String,
        /// Grafana password.
        password: String,
    },
    /// No authentication material present.
    Anonymous,
}

/// Deprecation notice emitted when the legacy API key is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deprecation {
    /// The variable that triggered the notice.
    pub variable: &'static str,
    /// The variable callers should migrate to.
    pub replacement: &'static str,
}

impl Deprecation {
    /// Renders the notice text surfaced to operators.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} is deprecated, please use {} instead; see the Grafana service \
             account documentation for details on creating service account tokens",
            self.variable, self.replacement
        )
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Credentials resolved from one snapshot, ready to encode.
///
/// # Invariants
/// - `deprecation` is `Some` exactly when the legacy API key case matched.
/// - The Grafana URL entry appears in both encodings regardless of case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    /// The single active credential case.
    credentials: Credentials,
    /// Grafana backend URL carried alongside the credentials.
    grafana_url: String,
    /// Deprecation notice for the legacy API key case.
    deprecation: Option<Deprecation>,
}

/// Resolves credentials from a snapshot following the fixed precedence.
///
/// Emits a `tracing` warning when the deprecated API key is selected; this
/// is the only side effect of resolution.
#[must_use]
pub fn resolve(snapshot: &EnvSnapshot) -> ResolvedCredentials {
    let grafana_url = snapshot.grafana_url().to_string();
    let (credentials, deprecation) = resolve_case(snapshot);
    if let Some(notice) = &deprecation {
        tracing::warn!(
            variable = notice.variable,
            replacement = notice.replacement,
            "deprecated credential variable in use"
        );
    }
    ResolvedCredentials {
        credentials,
        grafana_url,
        deprecation,
    }
}

/// Evaluates the precedence chain; first match wins.
fn resolve_case(snapshot: &EnvSnapshot) -> (Credentials, Option<Deprecation>) {
    if let Some(token) = snapshot.get(HarnessEnv::ServiceAccountToken) {
        return (Credentials::ServiceAccountToken(token.to_string()), None);
    }
    if let Some(key) = snapshot.get(HarnessEnv::ApiKey) {
        let notice = Deprecation {
            variable: HarnessEnv::ApiKey.as_str(),
            replacement: HarnessEnv::ServiceAccountToken.as_str(),
        };
        return (Credentials::ApiKey(key.to_string()), Some(notice));
    }
    match (snapshot.get(HarnessEnv::Username), snapshot.get(HarnessEnv::Password)) {
        (Some(username), Some(password)) => (
            Credentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
            None,
        ),
        _ => (Credentials::Anonymous, None),
    }
}

impl ResolvedCredentials {
    /// Returns the active credential case.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the deprecation notice, when the legacy key matched.
    #[must_use]
    pub const fn deprecation(&self) -> Option<&Deprecation> {
        self.deprecation.as_ref()
    }

    /// Encodes the credentials for injection into a child process
    /// environment (stdio transport).
    ///
    /// Basic-auth values pass through raw; both token forms keep their own
    /// variable names so the server distinguishes them.
    #[must_use]
    pub fn env_bundle(&self) -> BTreeMap<String, String> {
        let mut bundle = BTreeMap::new();
        bundle.insert(HarnessEnv::GrafanaUrl.as_str().to_string(), self.grafana_url.clone());
        match &self.credentials {
            Credentials::ServiceAccountToken(token) => {
                bundle.insert(
                    HarnessEnv::ServiceAccountToken.as_str().to_string(),
                    token.clone(),
                );
            }
            Credentials::ApiKey(key) => {
                bundle.insert(HarnessEnv::ApiKey.as_str().to_string(), key.clone());
            }
            Credentials::Basic {
                username,
                password,
            } => {
                bundle.insert(HarnessEnv::Username.as_str().to_string(), username.clone());
                bundle.insert(HarnessEnv::Password.as_str().to_string(), password.clone());
            }
            Credentials::Anonymous => {}
        }
        bundle
    }

    /// Encodes the credentials for injection into outbound HTTP requests
    /// (`sse` and `streamable-http` transports).
    ///
    /// Both token forms emit the same custom header; basic auth emits a
    /// standard `Authorization: Basic` header.
    #[must_use]
    pub fn header_bundle(&self) -> BTreeMap<String, String> {
        let mut bundle = BTreeMap::new();
        bundle.insert(HEADER_GRAFANA_URL.to_string(), self.grafana_url.clone());
        match &self.credentials {
            Credentials::ServiceAccountToken(token) => {
                bundle.insert(HEADER_GRAFANA_API_KEY.to_string(), token.clone());
            }
            Credentials::ApiKey(key) => {
                bundle.insert(HEADER_GRAFANA_API_KEY.to_string(), key.clone());
            }
            Credentials::Basic {
                username,
                password,
            } => {
                let encoded = Base64.encode(format!("{username}:{password}"));
                bundle.insert(HEADER_AUTHORIZATION.to_string(), format!("Basic {encoded}"));
            }
            Credentials::Anonymous => {}
        }
        bundle
    }
}

/// Resolves and encodes in one step for the stdio transport.
#[must_use]
pub fn resolve_as_env(snapshot: &EnvSnapshot) -> BTreeMap<String, String> {
    resolve(snapshot).env_bundle()
}

/// Resolves and encodes in one step for the HTTP transports.
#[must_use]
pub fn resolve_as_headers(snapshot: &EnvSnapshot) -> BTreeMap<String, String> {
    resolve(snapshot).header_bundle()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
