//! Test fixtures and helpers.
//!
//! Pre-built traces for consistent testing.

use galaxy_core::trace::{
    Explosion, PlayerScore, Thing, ThingKind, Trace, Turn, DEFAULT_GALAXY_SIZE,
};

/// Create a planet at a position.
#[must_use]
pub fn planet(x: f64, y: f64, player: Option<&str>) -> Thing {
    Thing {
        thing_type: ThingKind::Planet,
        id: None,
        position: [x, y],
        player: player.map(str::to_string),
    }
}

/// Create a ship owned by `player`.
#[must_use]
pub fn ship(x: f64, y: f64, player: &str) -> Thing {
    Thing {
        thing_type: ThingKind::Ship,
        id: None,
        position: [x, y],
        player: Some(player.to_string()),
    }
}

/// A small two-player skirmish: one neutral planet, one home planet each,
/// ships converging on the neutral planet and exploding on the last turn.
#[must_use]
pub fn skirmish_trace() -> Trace {
    let mut turns = Vec::new();
    for t in 0..4u32 {
        let offset = f64::from(t) * 50.0;
        let mut turn = Turn {
            turn: Some(u64::from(t)),
            things: vec![
                planet(250.0, 250.0, None),
                planet(50.0, 250.0, Some("blue")),
                planet(450.0, 250.0, Some("orange")),
                ship(50.0 + offset, 250.0, "blue"),
                ship(450.0 - offset, 250.0, "orange"),
            ],
            ..Default::default()
        };
        if t == 3 {
            turn.explosions.push(Explosion {
                position: [250.0, 250.0],
                ships_involved: 12,
                total_attack: 90,
            });
            turn.score = vec![
                PlayerScore {
                    player: "blue".to_string(),
                    planets: 1,
                    total_ships: 1,
                },
                PlayerScore {
                    player: "orange".to_string(),
                    planets: 1,
                    total_ships: 0,
                },
            ];
        }
        turns.push(turn);
    }
    Trace::new("skirmish", DEFAULT_GALAXY_SIZE, turns)
}

/// A long trace with `ships` ships per side on every turn.
#[must_use]
pub fn busy_trace(turns: usize, ships: usize) -> Trace {
    let turns = (0..turns)
        .map(|t| {
            let mut things = vec![
                planet(100.0, 100.0, Some("blue")),
                planet(400.0, 400.0, None),
            ];
            for s in 0..ships {
                let d = ((t + s) % 500) as f64;
                things.push(ship(d, 100.0, "blue"));
                things.push(ship(500.0 - d, 400.0, "orange"));
            }
            Turn {
                turn: Some(t as u64),
                things,
                ..Default::default()
            }
        })
        .collect();
    Trace::new("busy", DEFAULT_GALAXY_SIZE, turns)
}
