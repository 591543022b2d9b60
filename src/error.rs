//! Error types for the stepkit crate

use thiserror::Error;

/// Errors raised by the engine's own progress bookkeeping
///
/// Step failures are not represented here: a failing step returns its own
/// opaque [`anyhow::Error`], which composite steps propagate unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Progress call arrived out of order: start/finish with no enclosing
    /// context, or a start that would push the operation index past the
    /// declared operation count. Signals mismatched push/pop or
    /// start/finish pairing in the caller, never a transient condition.
    #[error("invalid monitor state: {0}")]
    InvalidMonitorState(String),
}

/// Result type for monitor operations
pub type Result<T> = std::result::Result<T, Error>;
