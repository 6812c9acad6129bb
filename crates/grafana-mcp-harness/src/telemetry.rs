// crates/grafana-mcp-harness/src/telemetry.rs
// ============================================================================
// Module: Telemetry Worker Handle
// Description: Injected handle over the external LLM-telemetry worker.
// Purpose: Best-effort reset of worker state at test boundaries.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! The telemetry collaborator runs a background task with a pending-event
//! queue. Left alive across tests it binds to a stale runtime scope, so the
//! lifecycle guard resets it at every test boundary. This handle is the
//! injection point: each guard receives the handle it must reset, rather
//! than reaching into a process-global slot. All resets are best-effort;
//! a worker that is already gone is not an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::PoisonError;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Telemetry Event
// ============================================================================

/// One pending telemetry record awaiting flush by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    /// Event label, opaque to the harness.
    pub label: String,
}

impl TelemetryEvent {
    /// Builds an event with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

// ============================================================================
// SECTION: Worker Handle
// ============================================================================

/// Handle to the background worker's task and pending-event queue.
///
/// # Invariants
/// - Both slots are independently clearable; clearing an empty slot is a
///   no-op.
/// - A poisoned slot lock is recovered, never propagated; resets must not
///   fail a test.
#[derive(Debug, Default)]
pub struct TelemetryWorkerHandle {
    /// Running worker task, when one is active.
    task: Mutex<Option<JoinHandle<()>>>,
    /// Sender feeding the worker's pending-event queue, when one is wired.
    queue: Mutex<Option<UnboundedSender<TelemetryEvent>>>,
}

impl TelemetryWorkerHandle {
    /// Creates a handle with no active worker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly started worker task and its queue sender.
    pub fn attach_worker(&self, task: JoinHandle<()>, queue: UnboundedSender<TelemetryEvent>) {
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        *self.queue.lock().unwrap_or_else(PoisonError::into_inner) = Some(queue);
    }

    /// Aborts the active worker task, if any.
    ///
    /// Best-effort: an absent or already finished task is ignored.
    pub fn cancel_task(&self) {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            task.abort();
        }
    }

    /// Drops the pending-event queue sender, if any.
    ///
    /// Dropping the sender lets a still-running worker drain and stop.
    pub fn clear_queue(&self) {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// Reports whether both slots are empty.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.task.lock().unwrap_or_else(PoisonError::into_inner).is_none()
            && self.queue.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
