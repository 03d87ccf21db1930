//! # Galaxy Core
//!
//! Trace model and playback controller for the galaxy trace viewer.
//!
//! This crate contains **only** the viewer's state logic:
//! - No rendering
//! - No terminal IO
//! - No async runtime
//!
//! This separation enables:
//! - Several independent viewers over one trace
//! - Unit testing playback without a display
//! - Swapping the renderer or the timer source
//!
//! ## Crate Structure
//!
//! - [`trace`] - Trace, turn and thing definitions, loading and compiling
//! - [`playback`] - Looping playback controller and its collaborator traits
//! - [`error`] - Error type shared by both

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod playback;
pub mod trace;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{GalaxyError, Result};
    pub use crate::playback::{
        PlaybackController, PlaybackMode, PlaybackState, Renderer, Scheduler, TimerId,
        DEFAULT_TICK_PERIOD,
    };
    pub use crate::trace::{
        Explosion, PlayerScore, PlayerTally, Thing, ThingKind, Trace, TraceSummary, Turn,
    };
}
