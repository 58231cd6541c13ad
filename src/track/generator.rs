//! Procedural waypoint generation
//!
//! Samples one waypoint per evenly spaced angle around a center,
//! walking clockwise, with only the radius and height randomized. Since
//! the angle is monotonic the resulting loop is star-shaped and never
//! self-intersects.

use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Track, TrackError};

/// Parameters for the random track generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Output file stem; the written file is `<stem>.track`.
    pub file_stem: String,
    pub center: Vec2,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Number of waypoints to sample.
    pub steps: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            file_stem: "random".to_string(),
            center: Vec2::ZERO,
            min_radius: 200.0,
            max_radius: 400.0,
            steps: 10,
        }
    }
}

impl GeneratorConfig {
    pub fn file_name(&self) -> String {
        format!("{}.track", self.file_stem)
    }
}

/// Sample a closed loop of waypoints.
///
/// Heights are 0 three times out of four, otherwise one of the discrete
/// elevations 0, 2, .. 22 so ramps stay drivable.
pub fn generate_points(config: &GeneratorConfig, rng: &mut impl Rng) -> Vec<Vec3> {
    let d_angle = TAU / config.steps as f32;
    let mut points = Vec::with_capacity(config.steps);

    for i in 0..config.steps {
        let dist = rng.random_range(config.min_radius..=config.max_radius);
        let height = (rng.random_range(0..=11u32) * 2) as f32;
        // Negated angle walks the loop clockwise.
        let angle = -(i as f32) * d_angle;

        let x = config.center.x + dist * angle.cos();
        let y = config.center.y + dist * angle.sin();
        let z = if rng.random::<f32>() < 0.25 { height } else { 0.0 };

        points.push(Vec3::new(x, y, z));
    }

    log::info!("generated {} waypoints", points.len());
    points
}

/// Sample a loop and validate it as a [`Track`].
pub fn generate_track(config: &GeneratorConfig, rng: &mut impl Rng) -> Result<Track, TrackError> {
    Track::from_points(generate_points(config, rng))
}

/// Sample a loop and write it to `<dir>/<stem>.track`.
pub fn generate_to_file(
    config: &GeneratorConfig,
    dir: &Path,
    rng: &mut impl Rng,
) -> Result<(Track, PathBuf), TrackError> {
    let track = generate_track(config, rng)?;
    let path = dir.join(config.file_name());
    track.save(&path)?;
    log::info!("waypoints written to {}", path.display());
    Ok((track, path))
}
