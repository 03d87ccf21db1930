//! # Galaxy Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Trace fixtures
//! - Recording renderer and manual timer scheduler
//! - Property-based testing strategies for playback operations

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collaborators;
pub mod fixtures;
pub mod strategies;

pub use collaborators::{ManualScheduler, RecordingRenderer};

/// Re-export proptest for convenience.
pub use proptest;
