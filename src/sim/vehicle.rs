//! Vehicle dynamics and per-car race progress
//!
//! Speed and rotation are scalar: speed acts along the car's facing,
//! rotation speed spins the facing. Both integrate their accelerations
//! once per tick with friction opposing motion, and both snap to exactly
//! zero when integration would carry them through zero, so a braking car
//! comes to rest instead of oscillating.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::powerup::{ActivePowerup, PowerupKind};
use crate::consts::*;
use crate::{heading_to_dir, normalize_heading};

/// Tunable handling parameters, shared by every stock car.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarTuning {
    pub max_speed: f32,
    pub max_speed_backwards: f32,
    pub max_rotation_speed: f32,
    /// Multiplied by current speed to provide the stopping force.
    pub friction: f32,
    /// Acceleration added per tick while a drive command is held.
    pub acceleration_increment: f32,
    /// Rotation speed applied while a turn command is held (deg/tick).
    pub turn_speed: f32,
    /// Counter-acceleration that bleeds off an active turn.
    pub turn_acceleration: f32,
    /// Whether the car may turn in place at zero speed.
    pub allow_static_turning: bool,
}

impl Default for CarTuning {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            max_speed_backwards: MAX_SPEED_BACKWARDS,
            max_rotation_speed: MAX_ROTATION_SPEED,
            friction: FRICTION,
            acceleration_increment: ACCELERATION_INCREMENT,
            turn_speed: TURN_SPEED,
            turn_acceleration: TURN_ACCELERATION,
            allow_static_turning: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Complete dynamic state of one vehicle.
///
/// `pos.z` is maintained by the host engine's floor handling; the
/// simulation only reads it to detect a car that fell through geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleState {
    pub pos: Vec3,
    /// Heading in degrees (crate convention: 0 = +Y, CCW positive).
    pub yaw: f32,
    pub speed: f32,
    pub rotation_speed: f32,
    pub acceleration: f32,
    pub rotation_acceleration: f32,
    pub drifting: bool,
    /// Per-gate pass counts; index 0 (the start line) begins at 1.
    pub passed_checkpoints: Vec<u32>,
    pub laps: u32,
    pub finished: bool,
    pub powerup: Option<ActivePowerup>,
}

impl VehicleState {
    pub fn new(gate_count: usize, pos: Vec3, yaw: f32) -> Self {
        let mut state = Self {
            pos,
            yaw: normalize_heading(yaw),
            speed: 0.0,
            rotation_speed: 0.0,
            acceleration: 0.0,
            rotation_acceleration: 0.0,
            drifting: false,
            passed_checkpoints: vec![0; gate_count],
            laps: 0,
            finished: false,
            powerup: None,
        };
        state.reset_progress();
        state
    }

    /// Reset checkpoint progress to the race-start state: only the
    /// start line counts as passed. Lap count is left alone.
    pub fn reset_progress(&mut self) {
        self.passed_checkpoints.fill(0);
        if let Some(start) = self.passed_checkpoints.first_mut() {
            *start = 1;
        }
    }

    pub fn has_powerup(&self, kind: PowerupKind) -> bool {
        self.powerup.is_some_and(|p| p.kind == kind)
    }

    pub fn collect_powerup(&mut self, kind: PowerupKind, now_tick: u64) {
        self.powerup = Some(ActivePowerup {
            kind,
            activated_tick: now_tick,
        });
    }

    /// Expire a stale powerup, returning its kind if one lapsed.
    pub fn tick_powerup(&mut self, now_tick: u64) -> Option<PowerupKind> {
        match self.powerup {
            Some(p) if p.expired(now_tick) => {
                self.powerup = None;
                Some(p.kind)
            }
            _ => None,
        }
    }

    /// Set speed, clamped to the tuning limits. A speed boost lifts the
    /// clamp entirely for its duration.
    pub fn set_speed(&mut self, speed: f32, tuning: &CarTuning) {
        self.speed = if self.has_powerup(PowerupKind::SpeedBoost) {
            speed
        } else {
            speed.clamp(tuning.max_speed_backwards, tuning.max_speed)
        };
    }

    pub fn set_rotation_speed(&mut self, rotation_speed: f32, tuning: &CarTuning) {
        self.rotation_speed =
            rotation_speed.clamp(-tuning.max_rotation_speed, tuning.max_rotation_speed);
    }

    /// Accumulate drive acceleration for this tick.
    pub fn drive(&mut self, direction: DriveDirection, tuning: &CarTuning) {
        let delta = match direction {
            DriveDirection::Forward => tuning.acceleration_increment,
            DriveDirection::Backward => -tuning.acceleration_increment,
        };
        self.acceleration += delta;
    }

    /// Start or hold a turn. Steering direction flips while reversing.
    pub fn turn(&mut self, direction: TurnDirection, tuning: &CarTuning) {
        if self.speed == 0.0 && !tuning.allow_static_turning {
            return;
        }

        let sign = match direction {
            TurnDirection::Left => {
                if self.speed >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            TurnDirection::Right => {
                if self.speed >= 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
        };

        self.set_rotation_speed(sign * tuning.turn_speed, tuning);
        self.rotation_acceleration = sign * tuning.turn_acceleration;

        // Drifting: keep the current speed, steer only.
        if self.drifting {
            self.acceleration = 0.0;
        }
    }

    /// Wall contact kills all motion unless a shield is active.
    pub fn on_wall_contact(&mut self) {
        if self.has_powerup(PowerupKind::Shield) {
            return;
        }
        self.speed = 0.0;
        self.rotation_speed = 0.0;
        self.acceleration = 0.0;
        self.rotation_acceleration = 0.0;
    }

    /// Integrate one fixed-timestep tick of motion.
    pub fn update_movement(&mut self, tuning: &CarTuning) {
        let friction = if self.has_powerup(PowerupKind::SpeedBoost) {
            tuning.friction * SPEED_BOOST_FRICTION_FACTOR
        } else {
            tuning.friction
        };

        // Friction: proportional to speed while under throttle, flat
        // otherwise, always opposing motion.
        if self.acceleration > friction {
            self.acceleration -= friction * self.speed;
        } else if self.speed > 0.0 {
            self.acceleration -= friction;
        } else if self.speed < 0.0 {
            self.acceleration += friction;
        }

        let prev_speed = self.speed;
        let prev_rotation = self.rotation_speed;
        self.set_speed(self.speed + self.acceleration, tuning);
        self.set_rotation_speed(
            self.rotation_speed + self.rotation_acceleration,
            tuning,
        );

        // Snap to rest when integration overshoots through zero so the
        // car never jitters around a stop.
        if prev_speed * self.speed < 0.0 {
            self.speed = 0.0;
            self.acceleration = 0.0;
        }
        if prev_rotation * self.rotation_speed < 0.0 {
            self.rotation_speed = 0.0;
            self.acceleration = 0.0;
            self.rotation_acceleration = 0.0;
        }

        let step = heading_to_dir(self.yaw) * self.speed;
        self.pos.x += step.x;
        self.pos.y += step.y;
        self.yaw = normalize_heading(self.yaw + self.rotation_speed);
    }
}
