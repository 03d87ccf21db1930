//! Trace model: the precomputed turns a viewer plays back.
//!
//! A trace is produced once by the simulation and never mutated afterwards.
//! Three on-disk forms are understood:
//!
//! - **`.json`**: a single document `{"galaxy_name": .., "size": [w, h], "turns": [..]}`
//!   (`galaxyName` is accepted as an alias)
//! - **`.jsonl`**: one turn object per line, as streamed while a game runs,
//!   optionally framed by `pythonium|<version>|<galaxy>` and
//!   `pythonium|<galaxy>|<turn>|<winner>` marker lines
//! - **`.trace`**: the compiled bincode form written by [`Trace::save_compiled`]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GalaxyError, Result};

/// Galaxy extent used when a trace does not record one.
pub const DEFAULT_GALAXY_SIZE: (u32, u32) = (500, 500);

/// Compiled trace format version for compatibility.
pub const TRACE_VERSION: u32 = 2;

const STREAM_MARKER: &str = "pythonium|";

/// Kind of object on the galaxy map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThingKind {
    /// A planet; may or may not be owned.
    Planet,
    /// A ship; always belongs to a player.
    Ship,
}

/// A planet or ship as recorded in one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    /// Planet or ship.
    pub thing_type: ThingKind,
    /// Stable identifier across turns, if the producer recorded one.
    #[serde(default)]
    pub id: Option<String>,
    /// Position in galaxy coordinates.
    pub position: [f64; 2],
    /// Owning player, `None` for neutral planets.
    #[serde(default)]
    pub player: Option<String>,
}

impl Thing {
    /// Owner name, treating an empty name the same as no owner.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.player.as_deref().filter(|p| !p.is_empty())
    }

    /// Whether this thing should be tinted with its owner's color.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.owner().is_some()
    }
}

/// A ship destroyed during a conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    /// Where the ship exploded.
    pub position: [f64; 2],
    /// Number of ships that took part in the combat.
    #[serde(default)]
    pub ships_involved: u32,
    /// Total attack involved in the combat.
    #[serde(default)]
    pub total_attack: u32,
}

/// Score line recorded by the simulation for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    /// Player name.
    pub player: String,
    /// Planets owned.
    #[serde(default)]
    pub planets: u32,
    /// Ships owned.
    #[serde(default)]
    pub total_ships: u32,
}

/// Planet and ship counts for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTally {
    /// Planets owned.
    pub planets: u32,
    /// Ships owned.
    pub ships: u32,
}

/// One simulation turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Turn number as recorded by the simulation.
    #[serde(default)]
    pub turn: Option<u64>,
    /// Planets and ships.
    #[serde(default)]
    pub things: Vec<Thing>,
    /// Explosions that happened during this turn.
    #[serde(default)]
    pub explosions: Vec<Explosion>,
    /// Per-player score, if recorded.
    #[serde(default)]
    pub score: Vec<PlayerScore>,
}

impl Turn {
    /// All planets in this turn.
    pub fn planets(&self) -> impl Iterator<Item = &Thing> {
        self.things
            .iter()
            .filter(|t| t.thing_type == ThingKind::Planet)
    }

    /// All ships in this turn.
    pub fn ships(&self) -> impl Iterator<Item = &Thing> {
        self.things.iter().filter(|t| t.thing_type == ThingKind::Ship)
    }

    /// Per-player planet and ship counts.
    ///
    /// Uses the recorded score when there is one, otherwise counts owned things.
    #[must_use]
    pub fn tally(&self) -> BTreeMap<String, PlayerTally> {
        let mut tally: BTreeMap<String, PlayerTally> = BTreeMap::new();

        if !self.score.is_empty() {
            for score in &self.score {
                tally.insert(
                    score.player.clone(),
                    PlayerTally {
                        planets: score.planets,
                        ships: score.total_ships,
                    },
                );
            }
            return tally;
        }

        for thing in &self.things {
            let Some(owner) = thing.owner() else {
                continue;
            };
            let entry = tally.entry(owner.to_string()).or_default();
            match thing.thing_type {
                ThingKind::Planet => entry.planets += 1,
                ThingKind::Ship => entry.ships += 1,
            }
        }
        tally
    }
}

/// Complete trace of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Galaxy identifier shown in the viewer header.
    #[serde(alias = "galaxyName", default)]
    pub galaxy_name: String,
    /// Galaxy width and height in world units.
    #[serde(default = "default_galaxy_size")]
    pub size: (u32, u32),
    /// Turns in playback order.
    #[serde(default)]
    pub turns: Vec<Turn>,
    /// Winning player, when the game recorded one.
    #[serde(default)]
    pub winner: Option<String>,
}

fn default_galaxy_size() -> (u32, u32) {
    DEFAULT_GALAXY_SIZE
}

#[derive(Serialize)]
struct CompiledTraceRef<'a> {
    version: u32,
    trace: &'a Trace,
}

#[derive(Deserialize)]
struct CompiledTrace {
    version: u32,
    trace: Trace,
}

impl Trace {
    /// Create a trace from already decoded turns.
    #[must_use]
    pub fn new(galaxy_name: impl Into<String>, size: (u32, u32), turns: Vec<Turn>) -> Self {
        Self {
            galaxy_name: galaxy_name.into(),
            size,
            turns,
            winner: None,
        }
    }

    /// Parse a trace document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        parse_document(json, "<inline>")
    }

    /// Parse the streamed form: one JSON turn per non-blank line.
    ///
    /// A stream header overrides `galaxy_name`; a stream footer supplies the
    /// winner.
    pub fn from_json_lines(galaxy_name: impl Into<String>, text: &str) -> Result<Self> {
        parse_lines(galaxy_name.into(), text, "<inline>")
    }

    /// Decode a compiled trace.
    pub fn from_compiled_bytes(bytes: &[u8]) -> Result<Self> {
        parse_compiled(bytes, "<inline>")
    }

    /// Load a trace, picking the decoder from the file extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or decoded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let trace = match extension.as_deref() {
            Some("trace" | "bin") => {
                let bytes = std::fs::read(path).map_err(|e| GalaxyError::TraceRead {
                    path: label.clone(),
                    message: e.to_string(),
                })?;
                parse_compiled(&bytes, &label)?
            }
            Some("jsonl" | "ndjson") => {
                let text = read_text(path, &label)?;
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                parse_lines(name, &text, &label)?
            }
            _ => parse_document(&read_text(path, &label)?, &label)?,
        };

        tracing::debug!(
            path = %label,
            galaxy = %trace.galaxy_name,
            turns = trace.len(),
            "Loaded trace"
        );
        Ok(trace)
    }

    /// Save the compiled form.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save_compiled<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let bytes = self.to_compiled_bytes()?;
        std::fs::write(path, bytes).map_err(|e| GalaxyError::TraceWrite {
            path: label,
            message: e.to_string(),
        })
    }

    /// Encode the compiled form in memory.
    pub fn to_compiled_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(&CompiledTraceRef {
            version: TRACE_VERSION,
            trace: self,
        })
        .map_err(|e| GalaxyError::TraceWrite {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the trace has no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turn at a playback step.
    #[must_use]
    pub fn turn(&self, step: usize) -> Option<&Turn> {
        self.turns.get(step)
    }

    /// Turn number to display for a step: the recorded number, else the step.
    #[must_use]
    pub fn turn_label(&self, step: usize) -> Option<u64> {
        self.turn(step).map(|t| t.turn.unwrap_or(step as u64))
    }

    /// Every player that owns something at some point, sorted by name.
    #[must_use]
    pub fn known_players(&self) -> Vec<String> {
        let mut players = BTreeSet::new();
        for turn in &self.turns {
            for thing in &turn.things {
                if let Some(owner) = thing.owner() {
                    players.insert(owner.to_string());
                }
            }
            for score in &turn.score {
                if !score.player.is_empty() {
                    players.insert(score.player.clone());
                }
            }
        }
        players.into_iter().collect()
    }

    /// Aggregate statistics for display.
    #[must_use]
    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            galaxy_name: self.galaxy_name.clone(),
            size: self.size,
            turns: self.len(),
            players: self.known_players(),
            winner: self.winner.clone(),
            peak_ships: self
                .turns
                .iter()
                .map(|t| t.ships().count())
                .max()
                .unwrap_or(0),
            total_explosions: self.turns.iter().map(|t| t.explosions.len()).sum(),
        }
    }
}

/// Aggregate statistics over a whole trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSummary {
    /// Galaxy identifier.
    pub galaxy_name: String,
    /// Galaxy extent.
    pub size: (u32, u32),
    /// Number of turns.
    pub turns: usize,
    /// Players seen across the trace.
    pub players: Vec<String>,
    /// Winning player, if recorded.
    pub winner: Option<String>,
    /// Largest number of ships alive in a single turn.
    pub peak_ships: usize,
    /// Explosions across all turns.
    pub total_explosions: usize,
}

impl fmt::Display for TraceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Galaxy: {}", self.galaxy_name)?;
        writeln!(f, "  Size: {}x{}", self.size.0, self.size.1)?;
        writeln!(f, "  Turns: {}", self.turns)?;
        if self.players.is_empty() {
            writeln!(f, "  Players: (none)")?;
        } else {
            writeln!(f, "  Players: {}", self.players.join(", "))?;
        }
        if let Some(winner) = &self.winner {
            writeln!(f, "  Winner: {winner}")?;
        }
        writeln!(f, "  Peak ships: {}", self.peak_ships)?;
        write!(f, "  Explosions: {}", self.total_explosions)
    }
}

fn read_text(path: &Path, label: &str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| GalaxyError::TraceRead {
        path: label.to_string(),
        message: e.to_string(),
    })
}

fn parse_document(json: &str, label: &str) -> Result<Trace> {
    serde_json::from_str(json).map_err(|e| GalaxyError::TraceParse {
        path: label.to_string(),
        message: e.to_string(),
    })
}

/// Stream marker line, without the leading `pythonium|`.
enum StreamMarker<'a> {
    /// `<version>|<galaxy>`
    Header { galaxy: &'a str },
    /// `<galaxy>|<turn>|<winner>`; `None` means nobody won.
    Footer { winner: Option<&'a str> },
}

fn parse_marker<'a>(fields: &'a str, index: usize, label: &str) -> Result<StreamMarker<'a>> {
    let parts: Vec<&str> = fields.split('|').collect();
    match parts.as_slice() {
        [_version, galaxy] => Ok(StreamMarker::Header { galaxy: *galaxy }),
        [_galaxy, _turn, winner] => Ok(StreamMarker::Footer {
            winner: match *winner {
                "" | "None" => None,
                name => Some(name),
            },
        }),
        _ => Err(GalaxyError::TraceParse {
            path: label.to_string(),
            message: format!("line {}: malformed stream marker", index + 1),
        }),
    }
}

fn parse_lines(galaxy_name: String, text: &str, label: &str) -> Result<Trace> {
    let mut galaxy_name = galaxy_name;
    let mut winner = None;
    let mut turns = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(fields) = line.strip_prefix(STREAM_MARKER) {
            match parse_marker(fields, index, label)? {
                StreamMarker::Header { galaxy } => galaxy_name = galaxy.to_string(),
                StreamMarker::Footer { winner: name } => winner = name.map(str::to_string),
            }
            continue;
        }
        let turn: Turn = serde_json::from_str(line).map_err(|e| GalaxyError::TraceParse {
            path: label.to_string(),
            message: format!("line {}: {}", index + 1, e),
        })?;
        turns.push(turn);
    }
    let mut trace = Trace::new(galaxy_name, DEFAULT_GALAXY_SIZE, turns);
    trace.winner = winner;
    Ok(trace)
}

fn parse_compiled(bytes: &[u8], label: &str) -> Result<Trace> {
    let parse_error = |e: bincode::Error| GalaxyError::TraceParse {
        path: label.to_string(),
        message: e.to_string(),
    };

    // Check the version before decoding the body so layout changes report cleanly.
    let version: u32 = bincode::deserialize(bytes).map_err(parse_error)?;
    if version != TRACE_VERSION {
        return Err(GalaxyError::TraceVersionMismatch {
            expected: TRACE_VERSION,
            found: version,
        });
    }

    let compiled: CompiledTrace = bincode::deserialize(bytes).map_err(parse_error)?;
    Ok(compiled.trace)
}
