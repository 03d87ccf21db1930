//! Transport control input.
//!
//! The viewer reads one command per line from stdin:
//!
//! ```text
//! toggle | p | space      play / pause
//! next | n                step forward (paused only)
//! prev | previous | b     step back (paused only)
//! seek <k> | s <k> | <k>  jump to step k
//! first | last            jump to the first / last step
//! faster | slower         halve / double the tick period
//! help | h | ?            show this list
//! quit | q                leave the viewer
//! ```
//!
//! Parsing is case-insensitive. Blank lines are ignored.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error type for unparseable input lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// Not a known command.
    #[error("Unknown command '{0}' (type 'help' for the list)")]
    Unknown(String),
    /// A seek command without a usable step number.
    #[error("Expected a step number, got '{0}'")]
    BadStep(String),
}

/// One user command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlInput {
    /// Play if paused, pause if playing.
    Toggle,
    /// Step forward one turn.
    Next,
    /// Step back one turn.
    Previous,
    /// Jump to a step.
    Seek(usize),
    /// Jump to the first step.
    First,
    /// Jump to the last step.
    Last,
    /// Halve the tick period.
    Faster,
    /// Double the tick period.
    Slower,
    /// Show the command list.
    Help,
    /// Leave the viewer.
    Quit,
}

/// Command list shown by `help`.
pub const HELP_TEXT: &str = "\
Commands:
  toggle | p | space      play / pause
  next | n                step forward (paused only)
  prev | previous | b     step back (paused only)
  seek <k> | s <k> | <k>  jump to step k
  first | last            jump to the first / last step
  faster | slower         halve / double the tick period
  help | h | ?            show this list
  quit | q                leave the viewer";

fn parse_step(raw: &str) -> Result<usize, ControlError> {
    raw.parse::<usize>()
        .map_err(|_| ControlError::BadStep(raw.to_string()))
}

impl ControlInput {
    /// Parse one input line. Returns `Ok(None)` for blank lines.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ControlError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

impl FromStr for ControlInput {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let mut words = lowered.split_whitespace();
        let command = words.next().unwrap_or_default();
        let argument = words.next();

        if words.next().is_some() {
            return Err(ControlError::Unknown(s.trim().to_string()));
        }

        let input = match (command, argument) {
            ("toggle" | "p" | "space" | "play" | "pause", None) => Self::Toggle,
            ("next" | "n", None) => Self::Next,
            ("prev" | "previous" | "b", None) => Self::Previous,
            ("seek" | "s", Some(step)) => Self::Seek(parse_step(step)?),
            ("seek" | "s", None) => return Err(ControlError::BadStep(String::new())),
            ("first", None) => Self::First,
            ("last", None) => Self::Last,
            ("faster", None) => Self::Faster,
            ("slower", None) => Self::Slower,
            ("help" | "h" | "?", None) => Self::Help,
            ("quit" | "q" | "exit", None) => Self::Quit,
            (word, None) if word.starts_with(|c: char| c.is_ascii_digit()) => {
                Self::Seek(parse_step(word)?)
            }
            _ => return Err(ControlError::Unknown(s.trim().to_string())),
        };
        Ok(input)
    }
}

impl fmt::Display for ControlInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle => write!(f, "toggle"),
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "prev"),
            Self::Seek(step) => write!(f, "seek {step}"),
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
            Self::Faster => write!(f, "faster"),
            Self::Slower => write!(f, "slower"),
            Self::Help => write!(f, "help"),
            Self::Quit => write!(f, "quit"),
        }
    }
}
