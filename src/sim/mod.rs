//! Deterministic race simulation
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (speeds are units per tick)
//! - Seeded RNG only
//! - No rendering or collision *detection*; the host engine reports
//!   contacts through the `RaceSession::on_*` handlers

pub mod powerup;
pub mod race;
pub mod strategy;
pub mod vehicle;

pub use powerup::{ActivePowerup, PowerupKind, PowerupSpot};
pub use race::{Car, CarId, RaceEvent, RaceSession};
pub use strategy::{DriveCommand, DriveStrategy, GateChaser, PowerupHunter, RandomDriver};
pub use vehicle::{CarTuning, DriveDirection, TurnDirection, VehicleState};
