// system-tests/tests/helpers/logging.rs
// ============================================================================
// Module: Test Logging
// Description: Tracing initialization for system-test suites.
// Purpose: Route harness log events through the test writer.
// Dependencies: tracing-subscriber
// ============================================================================

use tracing_subscriber::EnvFilter;

/// Installs the test subscriber once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
