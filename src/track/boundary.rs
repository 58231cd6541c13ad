//! Offset boundary edges with miter-joined corners
//!
//! For every waypoint the incoming and outgoing segment lines are pushed
//! sideways by half the track width and intersected; the intersection is
//! the true corner point of the edge, so consecutive wall tiles meet
//! without gaps regardless of how sharp the turn is.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::TrackError;
use crate::geom::{self, Facing, Line, line_intersection};

/// One derived point on a track edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub pos: Vec3,
    /// Direction of the edge span leaving this point.
    pub facing: Facing,
}

enum Side {
    Left,
    Right,
}

impl Side {
    /// Lateral unit offset for a horizontal travel direction.
    fn offset(&self, travel: Vec2) -> Vec2 {
        match self {
            Side::Left => geom::perp_left(travel),
            Side::Right => geom::perp_right(travel),
        }
    }
}

/// Compute the left and right boundary point sequences for a waypoint
/// loop. Expects a filtered loop (see [`super::file::filter_redundant`]);
/// coincident or vertically stacked waypoints cannot be offset uniquely
/// and produce [`TrackError::DegenerateGeometry`].
pub fn build_boundaries(
    points: &[Vec3],
    width: f32,
) -> Result<(Vec<BoundaryPoint>, Vec<BoundaryPoint>), TrackError> {
    let n = points.len();
    let half = width / 2.0;

    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);

    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];

        let travel_in = (cur - prev).normalize_or_zero();
        let travel_out = (next - cur).normalize_or_zero();
        let flat_in = horizontal_unit(travel_in, i)?;
        let flat_out = horizontal_unit(travel_out, i)?;

        left.push(miter_point(
            cur, travel_in, travel_out, flat_in, flat_out, half, Side::Left, i,
        ));
        right.push(miter_point(
            cur, travel_in, travel_out, flat_in, flat_out, half, Side::Right, i,
        ));
    }

    Ok((attach_facings(left), attach_facings(right)))
}

/// Horizontal projection of a travel direction, renormalized so lateral
/// offsets measure exactly half the width in the ground plane.
fn horizontal_unit(travel: Vec3, index: usize) -> Result<Vec2, TrackError> {
    let flat = travel.truncate();
    if flat.length_squared() < geom::PARALLEL_EPSILON {
        return Err(TrackError::DegenerateGeometry(format!(
            "waypoint {index} has no horizontal travel direction"
        )));
    }
    Ok(flat.normalize())
}

#[allow(clippy::too_many_arguments)]
fn miter_point(
    cur: Vec3,
    travel_in: Vec3,
    travel_out: Vec3,
    flat_in: Vec2,
    flat_out: Vec2,
    half: f32,
    side: Side,
    index: usize,
) -> Vec3 {
    let off_in = (side.offset(flat_in) * half).extend(0.0);
    let off_out = (side.offset(flat_out) * half).extend(0.0);

    let line_in = Line::new(cur + off_in, travel_in);
    let line_out = Line::new(cur + off_out, travel_out);

    match line_intersection(&line_in, &line_out) {
        Some(p) => p,
        None => {
            // Anti-parallel (or numerically straight) join: the offset
            // lines never meet, so fall back to offsetting the outgoing
            // segment only. Recovered locally; a track must always
            // generate fully.
            log::warn!(
                "waypoint {index}: parallel edge offsets, using outgoing-offset fallback"
            );
            cur + off_out
        }
    }
}

fn attach_facings(positions: Vec<Vec3>) -> Vec<BoundaryPoint> {
    let n = positions.len();
    (0..n)
        .map(|i| BoundaryPoint {
            pos: positions[i],
            facing: Facing::from_dir(positions[(i + 1) % n] - positions[i]),
        })
        .collect()
}
