// system-tests/src/bin/grafana_mcp_stub_server.rs
// ============================================================================
// Module: Grafana MCP Stub Stdio Server
// Description: Stdio runner for the stub MCP server.
// Purpose: Provide the subprocess target for stdio transport system-tests.
// Dependencies: system-tests, rmcp, tokio, tracing-subscriber
// ============================================================================

//! Stdio stub MCP server binary for system-tests. The harness launches it
//! with `--debug --log-level debug`; logs go to stderr so stdout stays a
//! clean MCP pipe.

use rmcp::ServiceExt;
use rmcp::transport::stdio;
use system_tests::stub::StubGrafanaServer;

/// Pid-file path that switches the binary into stall mode.
///
/// When set, the process records its pid at that path and parks without
/// ever answering the handshake, so suites can cancel a client
/// mid-handshake and watch the subprocess get torn down.
const STALL_PID_FILE_VAR: &str = "GRAFANA_MCP_STUB_STALL_PID_FILE";

/// Resolves the log filter from the flags the harness passes.
fn log_filter(args: &[String]) -> &'static str {
    let mut level = "info";
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" => level = "debug",
            "--log-level" => {
                if let Some(value) = iter.next() {
                    level = match value.as_str() {
                        "trace" => "trace",
                        "debug" => "debug",
                        "warn" => "warn",
                        "error" => "error",
                        _ => "info",
                    };
                }
            }
            _ => {}
        }
    }
    level
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&args))
        .with_writer(std::io::stderr)
        .init();

    if let Ok(pid_file) = std::env::var(STALL_PID_FILE_VAR) {
        stall(&pid_file).await;
        return;
    }

    let service = match StubGrafanaServer::new().serve(stdio()).await {
        Ok(service) => service,
        Err(err) => {
            eprintln!("grafana-mcp-stub-server: startup failed: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = service.waiting().await {
        eprintln!("grafana-mcp-stub-server: server failed: {err}");
        std::process::exit(1);
    }
}

/// Records the pid and parks forever without touching stdin/stdout.
async fn stall(pid_file: &str) {
    if let Err(err) = std::fs::write(pid_file, std::process::id().to_string()) {
        eprintln!("grafana-mcp-stub-server: pid file write failed: {err}");
        std::process::exit(1);
    }
    std::future::pending::<()>().await;
}
