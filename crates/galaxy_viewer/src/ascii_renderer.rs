//! ASCII galaxy renderer.
//!
//! Renders trace turns as ASCII art for terminal playback.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use galaxy_core::playback::Renderer;
use galaxy_core::trace::{Explosion, PlayerTally, Thing, ThingKind, Trace, Turn};

/// ASCII visualization configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiConfig {
    /// Columns of the map viewport.
    pub width: usize,
    /// Rows of the map viewport.
    pub height: usize,
    /// Show symbol legend and per-player counts.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
    /// Clear the terminal before every frame.
    pub clear_screen: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            show_legend: true,
            use_color: true,
            clear_screen: false,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const BLUE: &str = "\x1b[94m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const RED: &str = "\x1b[31m";
    pub const WHITE: &str = "\x1b[37m";
    pub const GRAY: &str = "\x1b[90m";

    pub const EXPLOSION: &str = "\x1b[1;33m";

    pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
}

const PLANET_GLYPH: char = 'O';
const SHIP_GLYPH: char = '^';
const EXPLOSION_GLYPH: char = '*';
const EMPTY_GLYPH: char = '.';

/// Colors handed out to players in order of appearance in the palette.
const PLAYER_COLORS: [&str; 5] = [
    colors::BLUE,
    colors::YELLOW,
    colors::GREEN,
    colors::MAGENTA,
    colors::RED,
];

/// Stable player-to-color assignment for one trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerPalette {
    players: Vec<String>,
}

impl PlayerPalette {
    /// Assign colors to every player seen in the trace, by sorted name.
    #[must_use]
    pub fn for_trace(trace: &Trace) -> Self {
        Self {
            players: trace.known_players(),
        }
    }

    /// Position of a player in the palette.
    #[must_use]
    pub fn index_of(&self, player: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    /// ANSI color for an owner; neutral and unknown owners are white.
    #[must_use]
    pub fn color_for(&self, owner: Option<&str>) -> &'static str {
        owner
            .and_then(|p| self.index_of(p))
            .map_or(colors::WHITE, |i| PLAYER_COLORS[i % PLAYER_COLORS.len()])
    }
}

type Cell = (char, &'static str);

fn to_cell(position: [f64; 2], size: (u32, u32), cols: usize, rows: usize) -> (usize, usize) {
    let fx = (position[0] / f64::from(size.0.max(1))).clamp(0.0, 1.0);
    let fy = (position[1] / f64::from(size.1.max(1))).clamp(0.0, 1.0);
    let col = ((fx * cols as f64) as usize).min(cols - 1);
    let row = ((fy * rows as f64) as usize).min(rows - 1);
    (col, row)
}

/// Cells an explosion covers around its center: bigger fights, bigger blast.
fn explosion_radius(explosion: &Explosion) -> usize {
    (explosion.ships_involved / 10).min(2) as usize
}

fn thing_cell(thing: &Thing, palette: &PlayerPalette) -> Cell {
    let glyph = match thing.thing_type {
        ThingKind::Planet => PLANET_GLYPH,
        ThingKind::Ship => SHIP_GLYPH,
    };
    (glyph, palette.color_for(thing.owner()))
}

fn compose_grid(
    turn: &Turn,
    size: (u32, u32),
    palette: &PlayerPalette,
    config: &AsciiConfig,
) -> Vec<Vec<Cell>> {
    let cols = config.width.max(1);
    let rows = config.height.max(1);
    let mut grid: Vec<Vec<Cell>> = vec![vec![(EMPTY_GLYPH, colors::GRAY); cols]; rows];

    // Explosions first so planets and ships stay visible on top
    for explosion in &turn.explosions {
        let (col, row) = to_cell(explosion.position, size, cols, rows);
        let radius = explosion_radius(explosion);
        for y in row.saturating_sub(radius)..=(row + radius).min(rows - 1) {
            for x in col.saturating_sub(radius)..=(col + radius).min(cols - 1) {
                grid[y][x] = (EXPLOSION_GLYPH, colors::EXPLOSION);
            }
        }
    }

    for planet in turn.planets() {
        let (col, row) = to_cell(planet.position, size, cols, rows);
        grid[row][col] = thing_cell(planet, palette);
    }

    for ship in turn.ships() {
        let (col, row) = to_cell(ship.position, size, cols, rows);
        grid[row][col] = thing_cell(ship, palette);
    }

    grid
}

fn horizontal_rule(output: &mut String, left: char, right: char, width: usize) {
    output.push(left);
    for _ in 0..width {
        output.push('═');
    }
    output.push(right);
    output.push('\n');
}

fn push_legend(
    output: &mut String,
    tally: &BTreeMap<String, PlayerTally>,
    palette: &PlayerPalette,
    config: &AsciiConfig,
) {
    let reset = if config.use_color { colors::RESET } else { "" };

    output.push_str(&format!(
        "║ {p}=Planet {s}=Ship {e}=Explosion\n",
        p = PLANET_GLYPH,
        s = SHIP_GLYPH,
        e = EXPLOSION_GLYPH
    ));

    if tally.is_empty() {
        output.push_str("║ No owned planets or ships\n");
        return;
    }

    for (player, counts) in tally {
        let color = if config.use_color {
            palette.color_for(Some(player))
        } else {
            ""
        };
        output.push_str(&format!(
            "║ {}{}{}: {} planets, {} ships\n",
            color, player, reset, counts.planets, counts.ships
        ));
    }
}

/// Render the turn at `step` as ASCII art.
///
/// Steps past the end of the trace produce a header-only frame.
pub fn render_turn(
    trace: &Trace,
    palette: &PlayerPalette,
    step: usize,
    config: &AsciiConfig,
) -> String {
    let mut output = String::new();
    let bold = if config.use_color { colors::BOLD } else { "" };
    let reset = if config.use_color { colors::RESET } else { "" };

    let Some(turn) = trace.turn(step) else {
        output.push_str(&format!(
            "{}╔══ Galaxy: {} │ no turn at step {} of {} ══╗{}\n",
            bold,
            trace.galaxy_name,
            step,
            trace.len(),
            reset
        ));
        return output;
    };

    output.push_str(&format!(
        "{}╔══ Galaxy: {} │ Turn: {} │ Step: {}/{} ══╗{}\n",
        bold,
        trace.galaxy_name,
        trace.turn_label(step).unwrap_or(step as u64),
        step + 1,
        trace.len(),
        reset
    ));

    let grid = compose_grid(turn, trace.size, palette, config);
    let width = config.width.max(1);

    horizontal_rule(&mut output, '║', '║', width);
    for row in &grid {
        output.push('║');
        for &(glyph, color) in row {
            if config.use_color && glyph != EMPTY_GLYPH {
                output.push_str(color);
                output.push(glyph);
                output.push_str(colors::RESET);
            } else {
                output.push(glyph);
            }
        }
        output.push_str("║\n");
    }

    if config.show_legend {
        horizontal_rule(&mut output, '╠', '╣', width);
        push_legend(&mut output, &turn.tally(), palette, config);
    }

    horizontal_rule(&mut output, '╚', '╝', width);
    output
}

/// Render a planets/ships comparison between two steps.
pub fn render_progress(trace: &Trace, from: usize, to: usize, config: &AsciiConfig) -> String {
    let mut output = String::new();
    let empty = BTreeMap::new();
    let before = trace.turn(from).map(Turn::tally);
    let after = trace.turn(to).map(Turn::tally);
    let before = before.as_ref().unwrap_or(&empty);
    let after = after.as_ref().unwrap_or(&empty);

    output.push_str(&format!(
        "\n{}Galaxy Progress: Turn {} → {}{}\n",
        if config.use_color { colors::BOLD } else { "" },
        trace.turn_label(from).unwrap_or(from as u64),
        trace.turn_label(to).unwrap_or(to as u64),
        if config.use_color { colors::RESET } else { "" }
    ));

    output.push_str("┌────────────────┬──────────┬──────────┬──────────┬──────────┐\n");
    output.push_str("│ Player         │ Planets  │ Change   │ Ships    │ Change   │\n");
    output.push_str("├────────────────┼──────────┼──────────┼──────────┼──────────┤\n");

    let mut players: Vec<&String> = before.keys().chain(after.keys()).collect();
    players.sort();
    players.dedup();

    let change = |b: u32, a: u32| -> String {
        let delta = i64::from(a) - i64::from(b);
        if delta > 0 {
            format!("+{delta}")
        } else {
            delta.to_string()
        }
    };

    for player in players {
        let b = before.get(player).copied().unwrap_or_default();
        let a = after.get(player).copied().unwrap_or_default();
        output.push_str(&format!(
            "│ {:<14} │ {:>8} │ {:>8} │ {:>8} │ {:>8} │\n",
            player,
            a.planets,
            change(b.planets, a.planets),
            a.ships,
            change(b.ships, a.ships)
        ));
    }

    output.push_str("└────────────────┴──────────┴──────────┴──────────┴──────────┘\n");
    output
}

/// Playback renderer that writes ASCII frames to a terminal or any writer.
#[derive(Debug)]
pub struct AsciiRenderer<W: Write> {
    trace: Arc<Trace>,
    palette: PlayerPalette,
    config: AsciiConfig,
    out: W,
    frames_written: u64,
    write_failures: u64,
}

impl<W: Write> AsciiRenderer<W> {
    /// Create a renderer over a shared trace.
    pub fn new(trace: Arc<Trace>, config: AsciiConfig, out: W) -> Self {
        let palette = PlayerPalette::for_trace(&trace);
        Self {
            trace,
            palette,
            config,
            out,
            frames_written: 0,
            write_failures: 0,
        }
    }

    /// Frames successfully written.
    #[must_use]
    pub const fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Frames lost to write errors.
    #[must_use]
    pub const fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Player color assignment in use.
    #[must_use]
    pub const fn palette(&self) -> &PlayerPalette {
        &self.palette
    }

    /// Consume the renderer and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render_step(&mut self, step: usize) {
        let mut frame = String::new();
        if self.config.clear_screen {
            frame.push_str(colors::CLEAR_SCREEN);
        }
        frame.push_str(&render_turn(&self.trace, &self.palette, step, &self.config));

        let result = self
            .out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush());
        match result {
            Ok(()) => self.frames_written += 1,
            Err(e) => {
                self.write_failures += 1;
                tracing::warn!(step, error = %e, "Failed to write frame");
            }
        }
    }
}
