//! Step abstractions: opaque units of work and ordered composites
//!
//! A step is either a leaf performing arbitrary work or a composite that
//! executes an ordered sequence of child steps as one logical operation,
//! with progress bookkeeping around each child.

use crate::monitor::ProgressMonitor;
use anyhow::Result;
use std::fmt;

/// An opaque, named unit of work.
///
/// The engine never inspects what `execute` does; it only sequences steps
/// and tracks their progress. A leaf may block on I/O or remote calls for
/// as long as it needs: timeouts, cancellation and retry, where required,
/// belong to the individual step's own implementation.
pub trait Step: Send + Sync + fmt::Debug {
    /// Human-readable name, used as the operation message in progress
    /// reporting.
    fn name(&self) -> &str;

    /// Number of progress operations this step accounts for.
    ///
    /// A leaf occupies a single slot; composites override this with their
    /// direct child count.
    fn operation_count(&self) -> usize {
        1
    }

    /// Perform the work, reporting nested progress through `monitor`.
    ///
    /// Failures are opaque to the engine and propagate to the caller
    /// unchanged.
    fn execute(&self, monitor: &mut ProgressMonitor) -> Result<()>;
}

/// A boxed step for type-erased storage
pub type BoxedStep = Box<dyn Step>;

/// Leaf step backed by a closure.
///
/// The closure receives the monitor, so an action that wants to report
/// sub-progress of its own can push a nested context; most actions simply
/// ignore it.
///
/// # Example
///
/// ```
/// use stepkit::{ActionStep, ProgressMonitor, Step};
///
/// let step = ActionStep::new("Verify configuration", |_monitor| Ok(()));
/// let mut monitor = ProgressMonitor::new();
/// step.execute(&mut monitor).unwrap();
/// ```
pub struct ActionStep<F>
where
    F: Fn(&mut ProgressMonitor) -> Result<()> + Send + Sync,
{
    name: String,
    action: F,
}

impl<F> ActionStep<F>
where
    F: Fn(&mut ProgressMonitor) -> Result<()> + Send + Sync,
{
    /// Create a leaf step that runs `action` when executed.
    pub fn new(name: impl Into<String>, action: F) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }
}

impl<F> Step for ActionStep<F>
where
    F: Fn(&mut ProgressMonitor) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, monitor: &mut ProgressMonitor) -> Result<()> {
        (self.action)(monitor)
    }
}

impl<F> fmt::Debug for ActionStep<F>
where
    F: Fn(&mut ProgressMonitor) -> Result<()> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionStep")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Step composed of multiple child steps executed in order.
///
/// Insertion order is execution order; duplicates of the same child are the
/// caller's responsibility. The child list is fixed once `execute` begins;
/// no re-wiring mid-run.
///
/// Executing a composite pushes a fresh progress context, runs each child
/// between `start_progress` and `finish_progress`, and pops the context on
/// every exit path. A child failure aborts the remaining siblings at that
/// level but still pops this level's context before propagating, so every
/// enclosing composite can pop cleanly as well.
#[derive(Debug)]
pub struct CompositeStep {
    name: String,
    steps: Vec<BoxedStep>,
}

impl CompositeStep {
    /// Create an empty composite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Create a composite from an ordered list of child steps.
    pub fn with_steps(name: impl Into<String>, steps: Vec<BoxedStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Append a child step; it executes after all previously added steps.
    pub fn add_step(&mut self, step: BoxedStep) {
        self.steps.push(step);
    }

    /// Ordered child steps.
    pub fn steps(&self) -> &[BoxedStep] {
        &self.steps
    }

    /// Child loop, kept separate so `execute` pops the context regardless
    /// of the outcome here.
    fn execute_steps(&self, monitor: &mut ProgressMonitor) -> Result<()> {
        for step in &self.steps {
            log::debug!("Starting {}", step.name());
            monitor.start_progress(step.name())?;
            step.execute(monitor)?;
            monitor.finish_progress()?;
        }
        Ok(())
    }
}

impl Step for CompositeStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn operation_count(&self) -> usize {
        self.steps.len()
    }

    fn execute(&self, monitor: &mut ProgressMonitor) -> Result<()> {
        monitor.push_context(self.steps.len(), &self.name);

        let roster: Vec<&str> = self.steps.iter().map(|step| step.name()).collect();
        log::debug!(
            "About to process composite \"{}\" with {} steps: {}",
            self.name,
            self.steps.len(),
            roster.join(", ")
        );

        let result = self.execute_steps(monitor);
        monitor.pop_context();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::reporter::MemoryReporter;
    use std::sync::{Arc, Mutex};

    fn recording_monitor() -> (ProgressMonitor, MemoryReporter) {
        let reporter = MemoryReporter::new();
        let monitor = ProgressMonitor::with_reporter(Box::new(reporter.clone()));
        (monitor, reporter)
    }

    /// Leaf that appends its name to a shared journal when executed.
    fn journaled_step(name: &str, journal: &Arc<Mutex<Vec<String>>>) -> BoxedStep {
        let journal = Arc::clone(journal);
        let recorded = name.to_string();
        Box::new(ActionStep::new(name, move |_| {
            journal.lock().unwrap().push(recorded.clone());
            Ok(())
        }))
    }

    fn failing_step(name: &str) -> BoxedStep {
        Box::new(ActionStep::new(name, |_| {
            anyhow::bail!("simulated step failure")
        }))
    }

    fn percentages(reporter: &MemoryReporter) -> Vec<f64> {
        reporter
            .messages()
            .iter()
            .map(|m| m.overall_percentage)
            .collect()
    }

    #[test]
    fn test_children_execute_in_insertion_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut composite = CompositeStep::new("root");
        composite.add_step(journaled_step("first", &journal));
        composite.add_step(journaled_step("second", &journal));
        composite.add_step(journaled_step("third", &journal));

        let (mut monitor, _reporter) = recording_monitor();
        composite.execute(&mut monitor).unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_flat_composite_reports_proportional_progress() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut composite = CompositeStep::new("root");
        for name in ["a", "b", "c", "d"] {
            composite.add_step(journaled_step(name, &journal));
        }

        let (mut monitor, reporter) = recording_monitor();
        composite.execute(&mut monitor).unwrap();

        assert_eq!(percentages(&reporter), vec![25.0, 50.0, 75.0, 100.0]);
        assert_eq!(monitor.context_stack().depth(), 0);
    }

    #[test]
    fn test_nested_composite_progress_sequence() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut inner = CompositeStep::new("inner");
        for name in ["l1", "l2", "l3", "l4"] {
            inner.add_step(journaled_step(name, &journal));
        }

        let mut root = CompositeStep::new("root");
        root.add_step(Box::new(inner));
        root.add_step(journaled_step("tail", &journal));

        let (mut monitor, reporter) = recording_monitor();
        root.execute(&mut monitor).unwrap();

        // Inner leaves subdivide the first 50-point slot; the inner
        // composite's own finish lands on 50; the tail closes out the run.
        let reported = percentages(&reporter);
        assert_eq!(reported, vec![12.0, 24.0, 37.0, 49.0, 50.0, 100.0]);
        assert!(reported.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(reported.last(), Some(&100.0));
    }

    #[test]
    fn test_failure_aborts_remaining_siblings() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut composite = CompositeStep::new("root");
        composite.add_step(journaled_step("before", &journal));
        composite.add_step(failing_step("boom"));
        composite.add_step(journaled_step("after", &journal));

        let (mut monitor, reporter) = recording_monitor();
        let err = composite.execute(&mut monitor).unwrap_err();

        assert_eq!(err.to_string(), "simulated step failure");
        assert_eq!(*journal.lock().unwrap(), vec!["before"]);
        // Only the sibling that completed before the failure reported.
        assert_eq!(percentages(&reporter), vec![33.0]);
        assert_eq!(monitor.context_stack().depth(), 0);
    }

    #[test]
    fn test_nested_failure_pops_every_ancestor_context() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut inner = CompositeStep::new("inner");
        inner.add_step(journaled_step("inner ok", &journal));
        inner.add_step(failing_step("inner boom"));

        let mut root = CompositeStep::new("root");
        root.add_step(Box::new(inner));
        root.add_step(journaled_step("never runs", &journal));

        let (mut monitor, reporter) = recording_monitor();
        let err = root.execute(&mut monitor).unwrap_err();

        assert_eq!(err.to_string(), "simulated step failure");
        assert_eq!(*journal.lock().unwrap(), vec!["inner ok"]);
        assert_eq!(monitor.context_stack().depth(), 0);
        // Nothing is emitted after the failing step's sibling finished.
        assert_eq!(percentages(&reporter).len(), 1);
    }

    #[test]
    fn test_monitor_misuse_surfaces_as_invalid_state() {
        // A leaf that calls finish without a matching start context of its
        // own still propagates the typed monitor error through execute.
        let mut root = CompositeStep::new("root");
        root.add_step(Box::new(ActionStep::new("misbehaving", |monitor| {
            monitor.push_context(1, "nested");
            let result = monitor.start_progress("one");
            monitor.pop_context();
            result?;
            // Second start at the root level exceeds the declared count.
            Err(monitor.start_progress("extra").unwrap_err().into())
        })));

        let (mut monitor, _reporter) = recording_monitor();
        let err = root.execute(&mut monitor).unwrap_err();
        assert!(err.downcast_ref::<Error>().is_some());
        assert_eq!(monitor.context_stack().depth(), 0);
    }

    #[test]
    fn test_empty_composite_is_a_no_op() {
        let composite = CompositeStep::new("empty");
        let (mut monitor, reporter) = recording_monitor();

        composite.execute(&mut monitor).unwrap();

        assert!(reporter.messages().is_empty());
        assert_eq!(monitor.context_stack().depth(), 0);
    }

    #[test]
    fn test_empty_composite_as_child_still_takes_its_slot() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut root = CompositeStep::new("root");
        root.add_step(Box::new(CompositeStep::new("empty")));
        root.add_step(journaled_step("tail", &journal));

        let (mut monitor, reporter) = recording_monitor();
        root.execute(&mut monitor).unwrap();

        assert_eq!(percentages(&reporter), vec![50.0, 100.0]);
    }

    #[test]
    fn test_operation_count_reflects_children() {
        let mut composite = CompositeStep::new("root");
        assert_eq!(composite.operation_count(), 0);

        composite.add_step(Box::new(ActionStep::new("a", |_| Ok(()))));
        composite.add_step(Box::new(ActionStep::new("b", |_| Ok(()))));
        assert_eq!(composite.operation_count(), 2);

        let leaf = ActionStep::new("leaf", |_| Ok(()));
        assert_eq!(leaf.operation_count(), 1);
    }

    #[test]
    fn test_with_steps_preserves_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeStep::with_steps(
            "root",
            vec![
                journaled_step("x", &journal),
                journaled_step("y", &journal),
            ],
        );
        assert_eq!(composite.steps().len(), 2);
        assert_eq!(composite.steps()[0].name(), "x");

        let (mut monitor, _reporter) = recording_monitor();
        composite.execute(&mut monitor).unwrap();
        assert_eq!(*journal.lock().unwrap(), vec!["x", "y"]);
    }
}
