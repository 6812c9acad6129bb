// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness probes and wait budgets for stub MCP servers.
// Purpose: Ensure stubs are accepting connections without arbitrary sleeps.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! `wait_for_port` polls a TCP connect until a stub listener accepts.
//! The wait budget it receives from the caller can be raised (never
//! lowered) through `GRAFANA_MCP_SYSTEM_TEST_TIMEOUT_SEC`, so slow CI
//! hosts stretch every readiness wait in one place.

use std::net::SocketAddr;
use std::time::Duration;
use std::time::Instant;

use tokio::net::TcpStream;
use tokio::time::sleep;

/// Seconds override stretching every readiness budget on slow hosts.
const ENV_TIMEOUT_SECS: &str = "GRAFANA_MCP_SYSTEM_TEST_TIMEOUT_SEC";

/// Polls a TCP connect until the stub accepts or the budget expires.
///
/// The requested budget is widened by the `GRAFANA_MCP_SYSTEM_TEST_TIMEOUT_SEC`
/// override when that resolves to a longer wait.
pub async fn wait_for_port(addr: SocketAddr, requested: Duration) -> Result<(), String> {
    let budget = effective_budget(requested, std::env::var(ENV_TIMEOUT_SECS).ok().as_deref())?;
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(err) => {
                if start.elapsed() > budget {
                    return Err(format!("stub readiness timeout after {attempts} attempts: {err}"));
                }
                sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

/// Combines a requested budget with the override, keeping the longer one.
///
/// A present but malformed override is a configuration mistake and fails
/// the wait outright rather than being silently ignored.
pub fn effective_budget(
    requested: Duration,
    override_raw: Option<&str>,
) -> Result<Duration, String> {
    let Some(raw) = override_raw else {
        return Ok(requested);
    };
    let trimmed = raw.trim();
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{ENV_TIMEOUT_SECS} must be an integer number of seconds: {raw:?}"))?;
    if secs == 0 {
        return Err(format!("{ENV_TIMEOUT_SECS} must be greater than zero"));
    }
    Ok(requested.max(Duration::from_secs(secs)))
}
