//! Shared geometry helpers for track construction
//!
//! Everything here works in the crate's Z-up coordinate frame. Offset and
//! intersection math happens in the horizontal (x, y) plane; z rides along
//! the line parameter.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{heading_from_dir, heading_to_dir};

/// Two horizontal directions with |cross| below this are treated as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// An infinite line described by a point and a direction.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Line {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

/// Intersect two lines in the horizontal plane.
///
/// Solves the 2D cross-product ratio test on the (x, y) components and
/// evaluates the full 3D point along `a`, so the z of the result follows
/// `a`'s slope. Returns `None` when the horizontal directions are
/// parallel and no unique intersection exists.
pub fn line_intersection(a: &Line, b: &Line) -> Option<Vec3> {
    let d1 = a.dir.truncate();
    let d2 = b.dir.truncate();

    let denom = d1.perp_dot(d2);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let p = (b.origin - a.origin).truncate();
    let t = p.perp_dot(d2) / denom;
    Some(a.origin + a.dir * t)
}

/// Rotate a horizontal vector 90 degrees counter-clockwise (to the left of
/// travel under the crate's heading convention).
#[inline]
pub fn perp_left(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Rotate a horizontal vector 90 degrees clockwise.
#[inline]
pub fn perp_right(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Strict 2D segment crossing test (shared endpoints do not count).
///
/// Used by drivers that need to know whether a movement step swept across
/// a gate span; the simulation core itself never calls this.
pub fn segments_cross(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let side = |o: Vec2, e: Vec2, p: Vec2| (e - o).perp_dot(p - o);

    let d1 = side(b1, b2, a1);
    let d2 = side(b1, b2, a2);
    let d3 = side(a1, a2, b1);
    let d4 = side(a1, a2, b2);

    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// A yaw/pitch orientation pair in degrees.
///
/// Yaw follows the crate heading convention (0 = +Y, counter-clockwise
/// positive); pitch is the elevation of the direction above the
/// horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Facing {
    pub yaw: f32,
    pub pitch: f32,
}

impl Facing {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Orientation looking along `dir`. A zero vector faces yaw 0, level.
    pub fn from_dir(dir: Vec3) -> Self {
        let horizontal = dir.truncate();
        let yaw = heading_from_dir(horizontal);
        let pitch = dir.z.atan2(horizontal.length()).to_degrees();
        Self { yaw, pitch }
    }

    /// Unit vector this facing looks along.
    pub fn forward(&self) -> Vec3 {
        let pitch = self.pitch.to_radians();
        let horizontal = heading_to_dir(self.yaw) * pitch.cos();
        Vec3::new(horizontal.x, horizontal.y, pitch.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_intersection_perpendicular() {
        // y = 5 crossed with x = -5
        let a = Line::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let b = Line::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));

        let p = line_intersection(&a, &b).unwrap();
        assert!((p - Vec3::new(-5.0, 5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_line_intersection_negative_parameter() {
        // Intersection behind a's origin still resolves.
        let a = Line::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let b = Line::new(Vec3::new(-3.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));

        let p = line_intersection(&a, &b).unwrap();
        assert!((p - Vec3::new(-3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_line_intersection_parallel_is_none() {
        let a = Line::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let b = Line::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(-2.0, -2.0, 0.0));
        assert!(line_intersection(&a, &b).is_none());
    }

    #[test]
    fn test_line_intersection_carries_z() {
        // a climbs in z; the returned point sits on a, not on the plane.
        let a = Line::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.5));
        let b = Line::new(Vec3::new(4.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));

        let p = line_intersection(&a, &b).unwrap();
        assert!((p - Vec3::new(4.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_perp_rotations() {
        let v = Vec2::new(3.0, 1.0);
        assert_eq!(perp_left(v), Vec2::new(-1.0, 3.0));
        assert_eq!(perp_right(v), Vec2::new(1.0, -3.0));
        // Left of +Y travel is -X.
        assert_eq!(perp_left(Vec2::Y), Vec2::NEG_X);
    }

    #[test]
    fn test_segments_cross() {
        let a1 = Vec2::new(-1.0, 0.0);
        let a2 = Vec2::new(1.0, 0.0);
        assert!(segments_cross(
            a1,
            a2,
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0)
        ));
        // Collinear / disjoint
        assert!(!segments_cross(
            a1,
            a2,
            Vec2::new(2.0, -1.0),
            Vec2::new(2.0, 1.0)
        ));
        // Meeting exactly at an endpoint does not count as a crossing.
        assert!(!segments_cross(
            a1,
            a2,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0)
        ));
    }

    #[test]
    fn test_facing_from_dir() {
        let f = Facing::from_dir(Vec3::new(0.0, 1.0, 1.0));
        assert!((f.yaw - 0.0).abs() < 1e-4);
        assert!((f.pitch - 45.0).abs() < 1e-4);

        let fwd = f.forward();
        assert!((fwd - Vec3::new(0.0, 1.0, 1.0).normalize()).length() < 1e-5);
    }
}
