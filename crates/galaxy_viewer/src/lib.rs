//! Terminal viewer for galaxy simulation traces.
//!
//! Plays a recorded trace in the terminal as ASCII frames, looping forever
//! until the user quits. Transport commands are read from stdin, one per
//! line:
//!
//! - **stdin**: Commands (`p`, `n`, `b`, `seek 12`, `faster`, `q`, ...)
//! - **stdout**: Rendered frames
//! - **stderr**: Logs
//!
//! See [`controls`] for the full command list.
//!
//! # Example
//!
//! ```bash
//! # Play a trace at the default speed
//! cargo run -p galaxy_viewer -- play game.json
//!
//! # Print one turn and exit
//! cargo run -p galaxy_viewer -- show game.json --step 10
//!
//! # Compile a JSON trace to the binary format
//! cargo run -p galaxy_viewer -- convert game.json game.trace
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii_renderer;
pub mod config;
pub mod controls;
pub mod scheduler;
pub mod session;

pub use ascii_renderer::{render_progress, render_turn, AsciiConfig, AsciiRenderer, PlayerPalette};
pub use config::{ConfigError, ViewerConfig, MAX_TICK_PERIOD, MIN_TICK_PERIOD};
pub use controls::{ControlError, ControlInput, HELP_TEXT};
pub use scheduler::{IntervalScheduler, TickReceiver};
pub use session::{apply_input, run_session, InputOutcome, SessionSummary};
