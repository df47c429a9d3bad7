//! Cancellable scheduled signals.
//!
//! Delayed UI effects (auto-scroll, encounter spawn delay) are issued as
//! tasks tied to the session lifecycle instead of fire-and-forget
//! callbacks: a reset cancels every pending handle, so a host timer that
//! fires late simply gets nothing back.

use std::collections::HashMap;

use crate::signal::UiSignal;

/// Opaque handle identifying one scheduled signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// A scheduled signal the host should deliver after the given delay by
/// calling [`Scheduler::complete`] with the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub handle: TaskHandle,
    pub delay_ms: u32,
}

/// Owns the pending delayed signals for one session.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    next_id: u64,
    pending: HashMap<TaskHandle, UiSignal>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signal for delayed delivery.
    pub fn schedule(&mut self, delay_ms: u32, signal: UiSignal) -> ScheduledTask {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending.insert(handle, signal);
        ScheduledTask { handle, delay_ms }
    }

    /// Redeem a fired timer. Cancelled or unknown handles yield `None`.
    pub fn complete(&mut self, handle: TaskHandle) -> Option<UiSignal> {
        self.pending.remove(&handle)
    }

    /// Cancel every pending task; their handles become worthless.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
