//! Penguin Rally entry point
//!
//! Headless driver standing in for the host engine: builds track
//! geometry, runs an AI-only race, performs the gate and powerup contact
//! checks the simulation core never does itself, and prints a JSON race
//! summary.
//!
//! Usage:
//!   penguin-rally race [track-file]
//!   penguin-rally generate [seed] [file-stem]

use std::path::Path;
use std::process::ExitCode;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use penguin_rally::consts::TOTAL_LAPS;
use penguin_rally::geom::segments_cross;
use penguin_rally::sim::{
    CarId, GateChaser, PowerupHunter, RaceSession, RandomDriver,
};
use penguin_rally::track::{GeneratorConfig, Track, TrackGeometry, TrackLayout, generator};

/// Safety cap so a race between hopeless drivers still terminates.
const MAX_TICKS: u64 = 200_000;
/// Pickup radius for powerup spots in the headless demo.
const PICKUP_RADIUS: f32 = 6.0;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("generate") => generate(args.get(2), args.get(3)),
        Some("race") => race(args.get(2)),
        None => race(None),
        Some(other) => {
            eprintln!("unknown command `{other}`");
            eprintln!("usage: penguin-rally race [track-file]");
            eprintln!("       penguin-rally generate [seed] [file-stem]");
            ExitCode::FAILURE
        }
    }
}

fn generate(seed: Option<&String>, stem: Option<&String>) -> ExitCode {
    let seed = seed.and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    let config = GeneratorConfig {
        file_stem: stem.cloned().unwrap_or_else(|| "random".to_string()),
        ..GeneratorConfig::default()
    };

    let mut rng = Pcg32::seed_from_u64(seed);
    match generator::generate_to_file(&config, Path::new("."), &mut rng) {
        Ok((track, path)) => {
            println!(
                "wrote {} ({} waypoints, seed {seed})",
                path.display(),
                track.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("track generation failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn race(path: Option<&String>) -> ExitCode {
    let track = match path {
        Some(p) => Track::load(Path::new(p)).unwrap_or_else(|err| {
            log::warn!("{err}; falling back to the built-in hexagon track");
            Track::hexagon()
        }),
        None => Track::hexagon(),
    };

    let geometry = match TrackGeometry::build(&track, &TrackLayout::default()) {
        Ok(geometry) => geometry,
        Err(err) => {
            log::error!("cannot build track geometry: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = RaceSession::new(track, geometry, TOTAL_LAPS, 42);
    session.add_ai(Box::new(GateChaser::new()));
    session.add_ai(Box::new(PowerupHunter::new()));
    session.add_ai(Box::new(RandomDriver::new(43)));
    session.start_race();
    session.scatter_powerups(4);

    let mut prev = positions(&session);
    for _ in 0..MAX_TICKS {
        session.tick();

        // Host-engine duty: contact tests against gates and powerups.
        let mut crossings: Vec<(CarId, usize)> = Vec::new();
        let mut pickups: Vec<(CarId, u32)> = Vec::new();
        for (car, (id, old_pos)) in session.cars().iter().zip(&prev) {
            let new_pos = car.state.pos;
            for gate in &session.geometry().gates {
                if segments_cross(
                    old_pos.truncate(),
                    new_pos.truncate(),
                    gate.left.truncate(),
                    gate.right.truncate(),
                ) {
                    crossings.push((*id, gate.id));
                }
            }
            for spot in session.powerups() {
                if (spot.pos - new_pos).truncate().length() < PICKUP_RADIUS {
                    pickups.push((*id, spot.id));
                }
            }
        }
        for (id, gate) in crossings {
            session.on_checkpoint_crossed(id, gate);
        }
        for (id, spot) in pickups {
            if let Some(kind) = session.take_powerup_spot(spot) {
                session.on_powerup_collected(id, kind);
            }
        }

        for event in session.drain_events() {
            log::debug!("{event:?}");
        }

        prev = positions(&session);
        if session.is_over() {
            break;
        }
    }

    match serde_json::to_string_pretty(&RaceSummary::new(&session)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn positions(session: &RaceSession) -> Vec<(CarId, Vec3)> {
    session
        .cars()
        .iter()
        .map(|car| (car.id, car.state.pos))
        .collect()
}

#[derive(Serialize)]
struct CarSummary {
    id: u32,
    ai: bool,
    laps: u32,
    checkpoints: Vec<u32>,
    finished: bool,
}

#[derive(Serialize)]
struct RaceSummary {
    ticks: u64,
    laps_to_win: u32,
    winner: Option<u32>,
    cars: Vec<CarSummary>,
}

impl RaceSummary {
    fn new(session: &RaceSession) -> Self {
        Self {
            ticks: session.time_ticks(),
            laps_to_win: session.total_laps(),
            winner: session.winner().map(|id| id.index()),
            cars: session
                .cars()
                .iter()
                .map(|car| CarSummary {
                    id: car.id.index(),
                    ai: car.is_ai(),
                    laps: car.state.laps,
                    checkpoints: car.state.passed_checkpoints.clone(),
                    finished: car.state.finished,
                })
                .collect(),
        }
    }
}
