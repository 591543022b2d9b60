//! Emitted value types for progress reporting

use serde::{Deserialize, Serialize};

/// Snapshot of overall execution progress, emitted once per finished
/// operation.
///
/// Every field is computed from the context stack at emission time; nothing
/// is cached between emissions. Messages are immutable once constructed and
/// serialize cleanly for transports that forward progress to a UI or
/// metrics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressMessage {
    /// Message of the innermost active operation.
    pub task_label: String,
    /// Weighted completion across the entire context stack, 0.0 to 100.0.
    pub overall_percentage: f64,
    /// Current operation message of the outermost context.
    pub root_task_label: String,
}
