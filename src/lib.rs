//! Penguin Rally - procedural racetracks and deterministic race simulation
//!
//! Core modules:
//! - `geom`: shared geometry helpers (headings, line intersection)
//! - `track`: track files, boundary/segment/gate generation
//! - `sim`: vehicle dynamics, lap tracking, drive strategies
//!
//! Rendering, audio and collision *detection* live in the host engine;
//! this crate produces the geometry the engine instantiates and consumes
//! the contact events the engine reports back.

pub mod geom;
pub mod sim;
pub mod track;

pub use geom::Facing;
pub use track::{Track, TrackError, TrackGeometry, TrackLayout};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Lateral distance between the left and right track edges.
    pub const TRACK_WIDTH: f32 = 50.0;
    /// Length of one wall tile along a boundary edge.
    pub const WALL_SEGMENT_LENGTH: f32 = 10.0;
    /// Length of one ground tile along a centerline span.
    pub const GROUND_SEGMENT_LENGTH: f32 = 20.0;
    /// Minimum usable waypoints after filtering.
    pub const MIN_TRACK_POINTS: usize = 4;

    /// Vehicle tuning defaults (units are per simulation tick)
    pub const MAX_SPEED: f32 = 2.0;
    pub const MAX_SPEED_BACKWARDS: f32 = -2.0;
    pub const MAX_ROTATION_SPEED: f32 = 5.0;
    /// Multiplied by current speed to provide the stopping force.
    pub const FRICTION: f32 = 0.03;
    pub const ACCELERATION_INCREMENT: f32 = FRICTION + 0.005;
    /// Degrees of yaw per tick while a turn command is held.
    pub const TURN_SPEED: f32 = 2.0;
    pub const TURN_ACCELERATION: f32 = -0.1;

    /// Laps to win a race.
    pub const TOTAL_LAPS: u32 = 3;
    /// Ticks a collected powerup stays active (10s at 60 ticks/s).
    pub const POWERUP_DURATION_TICKS: u64 = 600;
    /// Friction multiplier while a speed boost is active.
    pub const SPEED_BOOST_FRICTION_FACTOR: f32 = 0.5;
    /// How far below the lowest boundary point a vehicle may drop
    /// before it is considered to have fallen through the geometry.
    pub const FALL_RECOVERY_MARGIN: f32 = 20.0;
}

/// Normalize a heading to (-180, 180] degrees
#[inline]
pub fn normalize_heading(mut deg: f32) -> f32 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg <= -180.0 {
        deg += 360.0;
    }
    deg
}

/// Horizontal forward vector for a yaw in degrees.
///
/// Heading convention used crate-wide: yaw 0 faces +Y (the models'
/// forward axis) and positive yaw turns counter-clockwise, so forward is
/// `(-sin, cos)` rather than the textbook `(cos, sin)`. This function and
/// [`heading_from_dir`] are the only places the swap appears; everything
/// else must go through them.
#[inline]
pub fn heading_to_dir(yaw_deg: f32) -> Vec2 {
    let rad = yaw_deg.to_radians();
    Vec2::new(-rad.sin(), rad.cos())
}

/// Yaw in degrees for a horizontal direction vector (inverse of
/// [`heading_to_dir`]). Zero-length input yields 0.
#[inline]
pub fn heading_from_dir(dir: Vec2) -> f32 {
    if dir == Vec2::ZERO {
        return 0.0;
    }
    (-dir.x).atan2(dir.y).to_degrees()
}
