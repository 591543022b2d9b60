//! Progress monitoring for nested step execution
//!
//! The monitor owns the context stack for one root execution and turns
//! stack state into a single weighted percentage each time an operation
//! finishes.

use crate::context::{ContextStack, ProgressContext};
use crate::error::{Error, Result};
use crate::reporter::{LogReporter, ProgressReporter};
use crate::types::ProgressMessage;

/// Tracks nested execution position and reports weighted overall progress.
///
/// One monitor drives exactly one root execution end-to-end; its context
/// stack carries no synchronization and must never be shared across
/// concurrent executions. Background work that wants to report progress has
/// to marshal its calls back onto the driving thread.
///
/// [`push_context`](Self::push_context), [`pop_context`](Self::pop_context),
/// [`start_progress`](Self::start_progress) and
/// [`finish_progress`](Self::finish_progress) are the only mutators of
/// monitor state; the overall percentage is derived on demand, never
/// stored.
pub struct ProgressMonitor {
    stack: ContextStack,
    reporter: Box<dyn ProgressReporter>,
}

impl ProgressMonitor {
    /// Create a monitor that reports through the `log` facade.
    pub fn new() -> Self {
        Self::with_reporter(Box::new(LogReporter))
    }

    /// Create a monitor with a custom progress sink.
    pub fn with_reporter(reporter: Box<dyn ProgressReporter>) -> Self {
        Self {
            stack: ContextStack::new(),
            reporter,
        }
    }

    /// Read access to the context stack.
    pub fn context_stack(&self) -> &ContextStack {
        &self.stack
    }

    /// Enter a new nesting level with `operation_count` child operations.
    pub fn push_context(&mut self, operation_count: usize, label: &str) {
        self.stack.push(ProgressContext::new(operation_count, label));
    }

    /// Leave the current nesting level.
    ///
    /// Composite executors call this on every exit path, including failure
    /// propagation, so stack depth always returns to its pre-execution
    /// value. Popping an empty stack indicates unbalanced bookkeeping and
    /// is logged rather than escalated.
    pub fn pop_context(&mut self) -> Option<ProgressContext> {
        let popped = self.stack.pop();
        if popped.is_none() {
            log::warn!("pop_context called on an empty context stack");
        }
        popped
    }

    /// Record that the next child operation has started.
    ///
    /// Increments the innermost context's operation index and records the
    /// operation label as its current message.
    ///
    /// # Errors
    /// [`Error::InvalidMonitorState`] if no context is active or if the
    /// declared operation count would be exceeded; the index is left
    /// untouched in both cases.
    pub fn start_progress(&mut self, operation: &str) -> Result<()> {
        let context = self.stack.top_mut().ok_or_else(|| {
            Error::InvalidMonitorState("unable to start operation: no context available".into())
        })?;
        if context.current_operation_index() + 1 > context.operation_count() {
            return Err(Error::InvalidMonitorState(format!(
                "unable to start operation: index would exceed declared operation count; operation was: {operation}"
            )));
        }
        context.advance(operation);
        Ok(())
    }

    /// Record that the current child operation has finished and emit one
    /// [`ProgressMessage`] to the configured sink.
    ///
    /// The overall percentage is recomputed over the entire stack on every
    /// call. The task label is taken from the innermost context, the root
    /// task label from the outermost.
    ///
    /// # Errors
    /// [`Error::InvalidMonitorState`] if no context is active.
    pub fn finish_progress(&mut self) -> Result<()> {
        let (Some(top), Some(bottom)) = (self.stack.top(), self.stack.bottom()) else {
            return Err(Error::InvalidMonitorState(
                "unable to finish operation: no context available".into(),
            ));
        };
        let message = ProgressMessage {
            task_label: top.current_operation_message().to_string(),
            overall_percentage: subprogress(self.stack.outermost_first(), 100.0),
            root_task_label: bottom.current_operation_message().to_string(),
        };
        self.reporter.report_progress(message);
        Ok(())
    }
}

impl Default for ProgressMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively distribute `current` percentage points across the stack,
/// outermost context first.
///
/// Sibling operations already finished at a level take their full
/// proportional share of `current`; the slot belonging to the currently
/// executing sibling is subdivided by the next inner context. The innermost
/// recursion returns its `current` unmodified: a started leaf is credited
/// with its whole slot immediately, so progress resolution is bounded by
/// the tree's branching factor and depth, not by leaf-internal work.
///
/// Truncation happens at every level, so reported values can stall across
/// consecutive finishes when slots get small relative to depth; they never
/// decrease. Contexts with a zero operation count never reach this fold:
/// an empty composite pushes and pops its context without any start or
/// finish in between.
fn subprogress(contexts: &[ProgressContext], current: f64) -> f64 {
    let Some((context, rest)) = contexts.split_first() else {
        return current;
    };
    let index = context.current_operation_index() as f64;
    let count = context.operation_count() as f64;

    let finished = ((index - 1.0) / count * current).floor();
    let working = (1.0 / count * current).floor();

    finished + subprogress(rest, working)
}
