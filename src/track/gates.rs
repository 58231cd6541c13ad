//! Checkpoint gates spanning the track width
//!
//! One gate per waypoint, stretched between the matching left and right
//! boundary points. Gate 0 doubles as the start/finish line. Gates are
//! purely geometric; which gates a car has crossed is vehicle state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::boundary::BoundaryPoint;

/// A track-width-spanning checkpoint line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub id: usize,
    pub left: Vec3,
    pub right: Vec3,
}

impl Gate {
    /// Gate 0 is the start/finish line.
    pub fn is_start_finish(&self) -> bool {
        self.id == 0
    }

    /// Midpoint of the gate span, what the AI drivers steer toward.
    pub fn center(&self) -> Vec3 {
        (self.left + self.right) / 2.0
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).length()
    }
}

/// Build one gate per boundary index.
pub fn build_gates(left: &[BoundaryPoint], right: &[BoundaryPoint]) -> Vec<Gate> {
    debug_assert_eq!(left.len(), right.len());

    left.iter()
        .zip(right.iter())
        .enumerate()
        .map(|(id, (l, r))| Gate {
            id,
            left: l.pos,
            right: r.pos,
        })
        .collect()
}
