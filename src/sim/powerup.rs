//! Timed powerup modifiers
//!
//! A collected powerup changes vehicle dynamics for a fixed number of
//! ticks: speed boosts halve friction and lift the top-speed clamp,
//! shields make wall contact a no-op. Spots on the track are positional
//! only; the active effect belongs to the vehicle that collected it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::POWERUP_DURATION_TICKS;

/// Powerup flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    SpeedBoost,
    Shield,
}

impl PowerupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::SpeedBoost => "speed boost",
            PowerupKind::Shield => "shield",
        }
    }
}

/// A powerup effect currently applied to a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerup {
    pub kind: PowerupKind,
    /// Session tick at which the powerup was collected.
    pub activated_tick: u64,
}

impl ActivePowerup {
    pub fn expired(&self, now_tick: u64) -> bool {
        now_tick.saturating_sub(self.activated_tick) >= POWERUP_DURATION_TICKS
    }
}

/// A collectible placed on the track surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerupSpot {
    pub id: u32,
    pub kind: PowerupKind,
    pub pos: Vec3,
}
