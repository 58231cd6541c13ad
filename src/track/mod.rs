//! Racetrack geometry pipeline
//!
//! A track starts life as an ordered loop of waypoints (from a `.track`
//! file or the procedural generator). From those this module derives the
//! offset boundary edges, wall and ground tile placements, and checkpoint
//! gates that the host engine instantiates. Generation is one-shot and
//! deterministic; nothing here touches the engine's scene graph.

pub mod boundary;
pub mod file;
pub mod gates;
pub mod generator;
pub mod segments;

pub use boundary::BoundaryPoint;
pub use file::Track;
pub use gates::Gate;
pub use generator::GeneratorConfig;
pub use segments::SegmentPlacement;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{GROUND_SEGMENT_LENGTH, TRACK_WIDTH, WALL_SEGMENT_LENGTH};
use crate::geom::Facing;

/// Errors raised while loading or deriving track geometry.
///
/// Parse failures are fatal to track loading; callers are expected to
/// fall back to a known-good built-in track rather than abort the game.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("{file}:{line}: waypoint lines need 2 or 3 numeric fields")]
    MalformedTrackFile { file: String, line: usize },

    #[error("a track needs at least {min} usable waypoints, found {found}", min = crate::consts::MIN_TRACK_POINTS)]
    InsufficientTrackPoints { found: usize },

    #[error("degenerate track geometry: {0}")]
    DegenerateGeometry(String),

    #[error("reading track file: {0}")]
    Io(#[from] std::io::Error),
}

/// Tunable dimensions for derived geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackLayout {
    /// Lateral distance between the left and right edges.
    pub width: f32,
    /// Length of one wall tile along a boundary edge.
    pub wall_segment_length: f32,
    /// Length of one ground tile along a centerline span.
    pub ground_segment_length: f32,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self {
            width: TRACK_WIDTH,
            wall_segment_length: WALL_SEGMENT_LENGTH,
            ground_segment_length: GROUND_SEGMENT_LENGTH,
        }
    }
}

/// Everything derived from a track's waypoints in one generation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackGeometry {
    pub left: Vec<BoundaryPoint>,
    pub right: Vec<BoundaryPoint>,
    pub gates: Vec<Gate>,
    pub left_walls: Vec<SegmentPlacement>,
    pub right_walls: Vec<SegmentPlacement>,
    pub ground: Vec<SegmentPlacement>,
    /// Lowest z across both boundaries, used for fall-through recovery.
    pub min_boundary_height: f32,
}

impl TrackGeometry {
    /// Derive the full geometry for a track.
    ///
    /// Must complete before any vehicle is placed; start slots and
    /// initial facing come from the boundary at the start line.
    pub fn build(track: &Track, layout: &TrackLayout) -> Result<Self, TrackError> {
        let (left, right) = boundary::build_boundaries(track.points(), layout.width)?;
        let gates = gates::build_gates(&left, &right);

        let n = left.len();
        let mut left_walls = Vec::new();
        let mut right_walls = Vec::new();
        let mut ground = Vec::new();

        for i in 0..n {
            let j = (i + 1) % n;
            left_walls.extend(segments::place_segments(
                left[i].pos,
                left[j].pos,
                left[i].facing,
                layout.wall_segment_length,
            ));
            right_walls.extend(segments::place_segments(
                right[i].pos,
                right[j].pos,
                right[i].facing,
                layout.wall_segment_length,
            ));

            let (a, b) = track.span(i);
            ground.extend(segments::place_segments(
                a,
                b,
                Facing::from_dir(b - a),
                layout.ground_segment_length,
            ));
        }

        let min_boundary_height = left
            .iter()
            .chain(right.iter())
            .map(|p| p.pos.z)
            .fold(f32::INFINITY, f32::min);

        log::info!(
            "track geometry: {} waypoints, {} wall tiles, {} ground tiles, {} gates",
            n,
            left_walls.len() + right_walls.len(),
            ground.len(),
            gates.len()
        );

        Ok(Self {
            left,
            right,
            gates,
            left_walls,
            right_walls,
            ground,
            min_boundary_height,
        })
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Spawn position and yaw for car `slot` of `total` on the grid.
    ///
    /// Cars are spread across the start gate between the left and right
    /// boundary points, all facing along the left edge at the line.
    pub fn start_slot(&self, slot: usize, total: usize) -> (Vec3, f32) {
        let gate = &self.gates[0];
        let lanes = total.max(1) as f32;
        let t = (slot as f32 + 1.0) / (lanes + 1.0);
        (gate.left.lerp(gate.right, t), self.left[0].facing.yaw)
    }
}
