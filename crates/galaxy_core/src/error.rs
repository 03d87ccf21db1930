//! Error types for trace loading and playback.

use thiserror::Error;

/// Result type alias using [`GalaxyError`].
pub type Result<T> = std::result::Result<T, GalaxyError>;

/// Top-level error type for the trace model and the playback controller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GalaxyError {
    /// A controller cannot be built over a trace with no turns.
    #[error("Trace has no turns; a playback controller needs at least one step")]
    EmptyTrace,

    /// A seek request named a step outside `[0, len)`.
    #[error("Step {step} is out of range for a trace of {len} turns")]
    StepOutOfRange {
        /// Requested step.
        step: usize,
        /// Number of turns in the trace.
        len: usize,
    },

    /// Failed to read a trace file.
    #[error("Failed to read trace file '{path}': {message}")]
    TraceRead {
        /// Path to the file that could not be read.
        path: String,
        /// Error message.
        message: String,
    },

    /// Trace contents could not be decoded.
    #[error("Failed to parse trace '{path}': {message}")]
    TraceParse {
        /// Path (or source label) of the trace that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Compiled trace was written by an incompatible format version.
    #[error("Trace version mismatch: expected {expected}, got {found}")]
    TraceVersionMismatch {
        /// Version this build understands.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Failed to write a compiled trace.
    #[error("Failed to write trace file '{path}': {message}")]
    TraceWrite {
        /// Destination path.
        path: String,
        /// Error message.
        message: String,
    },
}
