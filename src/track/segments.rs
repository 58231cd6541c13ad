//! Tile placement along boundary edges and centerline spans
//!
//! Walls and ground are instanced from a single repeating model, so an
//! edge is covered by stepping one tile length at a time from its start.
//! The tile count rounds up: the last tile overlaps the far end rather
//! than leaving a gap.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geom::Facing;

/// One wall or ground tile: where it goes and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlacement {
    pub pos: Vec3,
    pub facing: Facing,
}

/// Place `ceil(|end - start| / segment_length)` tiles from `start`
/// toward `end`, all sharing the span's facing. A zero-length span
/// yields no tiles.
pub fn place_segments(
    start: Vec3,
    end: Vec3,
    facing: Facing,
    segment_length: f32,
) -> Vec<SegmentPlacement> {
    debug_assert!(segment_length > 0.0);

    let distance = (end - start).length();
    if distance == 0.0 {
        return Vec::new();
    }

    let needed = (distance / segment_length).ceil() as usize;
    let step = (end - start) * (segment_length / distance);

    (0..needed)
        .map(|i| SegmentPlacement {
            pos: start + step * i as f32,
            facing,
        })
        .collect()
}
