//! Progress sinks
//!
//! Reporter traits keep the engine free of hard dependencies on specific
//! UIs, log transports, or metrics pipelines; callers inject whichever sink
//! fits their surface.

use crate::types::ProgressMessage;
use std::sync::{Arc, Mutex};

/// Sink for progress messages emitted during execution
///
/// Implement this trait to receive one callback per finished operation. The
/// callback runs synchronously on the execution thread and should not block
/// excessively.
pub trait ProgressReporter: Send {
    /// Receive a progress message.
    fn report_progress(&mut self, message: ProgressMessage);
}

/// No-op reporter that discards all messages
pub struct NoReporter;

impl ProgressReporter for NoReporter {
    fn report_progress(&mut self, _message: ProgressMessage) {}
}

/// Reporter that forwards messages to the `log` facade
///
/// The default sink for monitors created with
/// [`ProgressMonitor::new`](crate::ProgressMonitor::new).
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report_progress(&mut self, message: ProgressMessage) {
        log::info!(
            "[{:5.1}%] {} ({})",
            message.overall_percentage,
            message.task_label,
            message.root_task_label
        );
    }
}

/// Reporter that records every message in shared memory
///
/// Clone handles observe the same underlying buffer, so a handle kept by
/// the caller can inspect messages recorded through the handle given to the
/// monitor. Useful in tests and for UIs that poll instead of subscribing.
#[derive(Clone, Default)]
pub struct MemoryReporter {
    messages: Arc<Mutex<Vec<ProgressMessage>>>,
}

impl MemoryReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages recorded so far, in emission order.
    pub fn messages(&self) -> Vec<ProgressMessage> {
        match self.messages.lock() {
            Ok(locked) => locked.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressReporter for MemoryReporter {
    fn report_progress(&mut self, message: ProgressMessage) {
        match self.messages.lock() {
            Ok(mut locked) => locked.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
    }
}
