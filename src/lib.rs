//! # stepkit
//!
//! Hierarchical step execution with nested weighted progress tracking.
//!
//! This crate provides the execution core for multi-step management
//! operations (batch device provisioning, tenant bootstrap, multi-stage
//! migrations):
//! - A composable [`Step`] abstraction where a step may itself be an
//!   ordered sequence of steps
//! - A [`ContextStack`] recording execution position at every nesting level
//! - A [`ProgressMonitor`] that recomputes a weighted completion percentage
//!   over the whole stack each time an operation finishes and emits it to a
//!   pluggable [`ProgressReporter`] sink
//!
//! The engine is deliberately ignorant of what a step does: it sequences,
//! tracks, and reports on opaque units of work supplied by the caller.
//! Execution is synchronous and sequential; one monitor drives one root
//! execution end-to-end on a single logical thread.
//!
//! ## Example
//!
//! ```
//! use stepkit::{ActionStep, CompositeStep, MemoryReporter, ProgressMonitor, Step};
//!
//! // Bootstrap runs two phases, the first of which has two sub-steps.
//! let mut prepare = CompositeStep::new("Prepare tenant");
//! prepare.add_step(Box::new(ActionStep::new("Create schema", |_| Ok(()))));
//! prepare.add_step(Box::new(ActionStep::new("Seed defaults", |_| Ok(()))));
//!
//! let mut root = CompositeStep::new("Bootstrap");
//! root.add_step(Box::new(prepare));
//! root.add_step(Box::new(ActionStep::new("Register devices", |_| Ok(()))));
//!
//! // Execute with a recording sink.
//! let reporter = MemoryReporter::new();
//! let mut monitor = ProgressMonitor::with_reporter(Box::new(reporter.clone()));
//! root.execute(&mut monitor)?;
//!
//! let percentages: Vec<f64> = reporter
//!     .messages()
//!     .iter()
//!     .map(|m| m.overall_percentage)
//!     .collect();
//! assert_eq!(percentages, vec![25.0, 50.0, 50.0, 100.0]);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Progress semantics
//!
//! A finished sibling contributes its full proportional share of the
//! enclosing slot; the slot of the sibling currently executing is
//! subdivided by the next inner context. A started leaf is credited with
//! its entire slot immediately: the engine has no visibility into
//! leaf-internal work, so progress resolution is bounded by the step
//! tree's shape. Truncation at every nesting level means the reported
//! percentage may repeat across consecutive finishes; it never decreases.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod monitor;
pub mod reporter;
pub mod step;
pub mod types;

// Re-export main types at crate root
pub use context::{ContextStack, ProgressContext};
pub use error::{Error, Result};
pub use monitor::ProgressMonitor;
pub use reporter::{LogReporter, MemoryReporter, NoReporter, ProgressReporter};
pub use step::{ActionStep, BoxedStep, CompositeStep, Step};
pub use types::ProgressMessage;
