// system-tests/tests/helpers/env.rs
// ============================================================================
// Module: Test Environment Helpers
// Description: Scoped process-environment mutation for capture-path tests.
// Purpose: Guarantee mutated variables are restored when a test unwinds.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Most suites avoid process-env mutation entirely by building snapshots
//! from explicit pairs; `VarGuard` exists for the few tests that exercise
//! the capture path. The guard records the variable's prior state and
//! restores it on drop, so a failing assertion cannot leak the mutation
//! into the rest of the binary.

#![allow(unsafe_code, reason = "Capture-path tests must mutate the process environment.")]

use std::ffi::OsString;

/// Scoped override of one process environment variable.
///
/// Restores the previous value (or removes the variable) on drop.
pub struct VarGuard {
    /// Variable under the guard.
    key: &'static str,
    /// Value before the override, `None` when the variable was unset.
    previous: Option<OsString>,
}

impl VarGuard {
    /// Overrides `key` with `value` until the guard drops.
    #[must_use]
    pub fn set(key: &'static str, value: &str) -> Self {
        let previous = std::env::var_os(key);
        // SAFETY: suites that hold a guard are the only readers of the
        // mutated variable within their test binary.
        unsafe {
            std::env::set_var(key, value);
        }
        Self { key, previous }
    }
}

impl Drop for VarGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            // SAFETY: restores the exact state recorded before the override.
            Some(value) => unsafe {
                std::env::set_var(self.key, value);
            },
            // SAFETY: the variable was unset before the override.
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}
