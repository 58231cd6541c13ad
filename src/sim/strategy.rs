//! AI drive strategies
//!
//! A strategy turns read-only race state into one tick's worth of drive
//! commands. Strategies only see the static track geometry, powerup
//! positions and their own car's state, so cars can be updated in any
//! order.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::powerup::PowerupSpot;
use super::vehicle::{DriveDirection, TurnDirection, VehicleState};
use crate::normalize_heading;
use crate::track::TrackGeometry;
use glam::Vec3;

/// Ignore heading errors smaller than this (degrees) to stop the wheel
/// from sawing left and right on straights.
const STEER_DEADBAND: f32 = 5.0;

/// One tick of driver input.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    pub drive: Option<DriveDirection>,
    pub turn: Option<TurnDirection>,
    pub drifting: bool,
}

/// Chooses the next drive input for a car.
pub trait DriveStrategy {
    fn next_input(
        &mut self,
        state: &VehicleState,
        geometry: &TrackGeometry,
        powerups: &[PowerupSpot],
    ) -> DriveCommand;
}

/// Full throttle with random steering twitches.
pub struct RandomDriver {
    rng: Pcg32,
}

impl RandomDriver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl DriveStrategy for RandomDriver {
    fn next_input(
        &mut self,
        _state: &VehicleState,
        _geometry: &TrackGeometry,
        _powerups: &[PowerupSpot],
    ) -> DriveCommand {
        let turn = match self.rng.random_range(0..6u32) {
            0 => Some(TurnDirection::Left),
            1 => Some(TurnDirection::Right),
            _ => None,
        };
        DriveCommand {
            drive: Some(DriveDirection::Forward),
            turn,
            drifting: false,
        }
    }
}

/// Steers for the center of the next gate that would advance progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateChaser;

impl GateChaser {
    pub fn new() -> Self {
        Self
    }

    /// Index of the gate this car should cross next: the first gate
    /// still behind its predecessor's pass count, or the start line
    /// when the lap is otherwise complete.
    pub fn target_gate(state: &VehicleState) -> usize {
        let passed = &state.passed_checkpoints;
        for k in 1..passed.len() {
            if passed[k - 1] > passed[k] {
                return k;
            }
        }
        0
    }
}

impl DriveStrategy for GateChaser {
    fn next_input(
        &mut self,
        state: &VehicleState,
        geometry: &TrackGeometry,
        _powerups: &[PowerupSpot],
    ) -> DriveCommand {
        let gate = &geometry.gates[Self::target_gate(state)];
        steer_toward(state, gate.center())
    }
}

/// Detours to the nearest powerup, falling back to gate chasing when
/// none are on the track.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerupHunter {
    chaser: GateChaser,
}

impl PowerupHunter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DriveStrategy for PowerupHunter {
    fn next_input(
        &mut self,
        state: &VehicleState,
        geometry: &TrackGeometry,
        powerups: &[PowerupSpot],
    ) -> DriveCommand {
        let nearest = powerups.iter().min_by(|a, b| {
            let da = (a.pos - state.pos).length_squared();
            let db = (b.pos - state.pos).length_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

        match nearest {
            Some(spot) => steer_toward(state, spot.pos),
            None => self.chaser.next_input(state, geometry, powerups),
        }
    }
}

/// Drive forward, steering toward `target` with a small deadband.
fn steer_toward(state: &VehicleState, target: Vec3) -> DriveCommand {
    let to_target = (target - state.pos).truncate();
    let desired = crate::heading_from_dir(to_target);
    let delta = normalize_heading(desired - state.yaw);

    let turn = if delta > STEER_DEADBAND {
        Some(TurnDirection::Left)
    } else if delta < -STEER_DEADBAND {
        Some(TurnDirection::Right)
    } else {
        None
    };

    DriveCommand {
        drive: Some(DriveDirection::Forward),
        turn,
        drifting: false,
    }
}
