// system-tests/src/lib.rs
// ============================================================================
// Module: Grafana MCP Harness System Tests Library
// Description: Shared stub-server code for harness system-test scenarios.
// Purpose: Provide the stub MCP server used by the suites and the stdio bin.
// Dependencies: rmcp, serde, serde_json
// ============================================================================

//! ## Overview
//! This crate hosts the stub MCP server used by the harness system-test
//! suites in `system-tests/tests` and by the stdio stub binary in
//! `system-tests/src/bin`. The stub stands in for the real Grafana MCP
//! server: it advertises two tools that let the suites observe, from the
//! server side, what the harness put on the wire.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod stub;
