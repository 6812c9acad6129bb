// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for harness system-tests.
// Purpose: Provide stub servers, env plumbing, and timing utilities.
// Dependencies: system-tests, grafana-mcp-harness
// ============================================================================

//! ## Overview
//! Shared helpers for harness system-tests.
//! Purpose: Provide stub servers, env plumbing, and timing utilities.
//! Invariants:
//! - Suites are hermetic: every server they talk to is a loopback stub.
//! - Stub teardown is explicit; helpers never leak listeners across tests.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod env;
pub mod logging;
pub mod readiness;
pub mod stub_server;
