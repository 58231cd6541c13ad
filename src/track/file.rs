//! Track files and the waypoint loop they describe
//!
//! Format: one waypoint per line as whitespace-separated numbers, two
//! (x y, z defaults to 0) or three (x y z). `#` starts a comment for the
//! rest of the line; blank lines are skipped. The loop is implicitly
//! cyclic, so a file may optionally repeat its first point at the end.

use std::fmt::Write as _;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::TrackError;
use crate::consts::MIN_TRACK_POINTS;
use crate::geom::PARALLEL_EPSILON;

/// Default track shipped with the game, used as the fallback when a
/// user-supplied file fails to load.
const HEXAGON_TRACK: &str = include_str!("../../tracks/hexagon.track");

/// An ordered, cyclic loop of centerline waypoints.
///
/// Invariants held after construction: no two consecutive waypoints are
/// coincident, no waypoint sits on a straight line through its
/// neighbors, and the loop has at least [`MIN_TRACK_POINTS`] points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    points: Vec<Vec3>,
}

impl Track {
    /// Parse track file text. `file` is used in error messages only.
    pub fn parse(file: &str, text: &str) -> Result<Self, TrackError> {
        Self::from_points(parse_points(file, text)?)
    }

    /// Build a track from raw waypoints, applying the closing-point and
    /// redundancy filters.
    pub fn from_points(mut points: Vec<Vec3>) -> Result<Self, TrackError> {
        // The loop is cyclic; a repeated closing point is redundant.
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        filter_redundant(&mut points);

        if points.len() < MIN_TRACK_POINTS {
            return Err(TrackError::InsufficientTrackPoints {
                found: points.len(),
            });
        }

        Ok(Self { points })
    }

    /// Load and parse a track file from disk.
    pub fn load(path: &Path) -> Result<Self, TrackError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// The built-in default track.
    pub fn hexagon() -> Self {
        Self::parse("hexagon.track", HEXAGON_TRACK).expect("built-in track is valid")
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Centerline span from waypoint `i` to its successor (cyclic).
    pub fn span(&self, i: usize) -> (Vec3, Vec3) {
        (self.points[i], self.points[(i + 1) % self.points.len()])
    }

    /// Serialize back to the track file format.
    pub fn to_track_string(&self) -> String {
        points_to_string(&self.points)
    }

    /// Write the track to disk in the track file format.
    pub fn save(&self, path: &Path) -> Result<(), TrackError> {
        std::fs::write(path, self.to_track_string())?;
        Ok(())
    }
}

/// Parse waypoint lines without any filtering.
pub fn parse_points(file: &str, text: &str) -> Result<Vec<Vec3>, TrackError> {
    let mut points = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("");
        if content.trim().is_empty() {
            continue;
        }

        let malformed = || TrackError::MalformedTrackFile {
            file: file.to_string(),
            line,
        };

        let fields = content
            .split_whitespace()
            .map(|tok| tok.parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|_| malformed())?;

        let point = match fields.as_slice() {
            [x, y] => Vec3::new(*x, *y, 0.0),
            [x, y, z] => Vec3::new(*x, *y, *z),
            _ => return Err(malformed()),
        };
        points.push(point);
    }

    Ok(points)
}

/// Serialize waypoints in the track file format, one per line.
pub fn points_to_string(points: &[Vec3]) -> String {
    let mut out = String::new();
    for p in points {
        let _ = writeln!(out, "{} {} {}", p.x, p.y, p.z);
    }
    out
}

/// Remove waypoints that contribute no turn.
///
/// A waypoint whose normalized directions to its neighbors are parallel
/// (cross product ~ zero, which also covers coincident neighbors) breaks
/// the miter-join math and is dropped. Scans backward, repeating until a
/// full pass removes nothing, so the filter is a fixpoint: running it on
/// its own output never removes more.
pub fn filter_redundant(points: &mut Vec<Vec3>) {
    loop {
        let mut removed = false;
        let mut i = points.len();
        while i > 0 {
            if points.len() < 3 {
                return;
            }
            i -= 1;
            let n = points.len();
            let cur = points[i];
            let to_prev = (points[(i + n - 1) % n] - cur).normalize_or_zero();
            let to_next = (points[(i + 1) % n] - cur).normalize_or_zero();
            if to_prev.cross(to_next).length_squared() < PARALLEL_EPSILON {
                points.remove(i);
                removed = true;
            }
        }
        if !removed {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_two_and_three_fields() {
        let track = "0 0\n0 100 5\n100 100\n100 0 2.5\n";
        let points = parse_points("t.track", track).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(points[1], Vec3::new(0.0, 100.0, 5.0));
        assert_eq!(points[3], Vec3::new(100.0, 0.0, 2.5));
    }

    #[test]
    fn test_parse_trailing_comment() {
        let points = parse_points("t.track", "1 2 3 # comment\n").unwrap();
        assert_eq!(points, vec![Vec3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks_without_losing_line_numbers() {
        let text = "# header\n\n3 4\nbogus line here\n";
        let err = parse_points("demo.track", text).unwrap_err();
        match err {
            TrackError::MalformedTrackFile { file, line } => {
                assert_eq!(file, "demo.track");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!(matches!(
            parse_points("t.track", "1\n"),
            Err(TrackError::MalformedTrackFile { line: 1, .. })
        ));
        assert!(matches!(
            parse_points("t.track", "1 2 3 4\n"),
            Err(TrackError::MalformedTrackFile { line: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_closing_point_dropped() {
        let track = Track::parse("t.track", "0 0\n0 100\n100 100\n100 0\n0 0\n").unwrap();
        assert_eq!(track.len(), 4);
    }

    #[test]
    fn test_collinear_midpoint_removed() {
        // (0,50) sits on the left edge of the square and adds no turn.
        let track =
            Track::parse("t.track", "0 0\n0 50\n0 100\n100 100\n100 0\n").unwrap();
        assert_eq!(track.len(), 4);
        assert!(!track.points().contains(&Vec3::new(0.0, 50.0, 0.0)));
    }

    #[test]
    fn test_spike_removed() {
        // (200,50) is a straight-out-and-back spike off the right edge.
        let mut points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::new(100.0, 100.0, 0.0),
            Vec3::new(100.0, 50.0, 0.0),
            Vec3::new(200.0, 50.0, 0.0),
            Vec3::new(100.0, 50.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
        ];
        filter_redundant(&mut points);
        assert!(!points.contains(&Vec3::new(200.0, 50.0, 0.0)));
    }

    #[test]
    fn test_coincident_neighbors_removed() {
        let track =
            Track::parse("t.track", "0 0\n0 100\n0 100\n100 100\n100 0\n").unwrap();
        assert_eq!(track.len(), 4);
    }

    #[test]
    fn test_insufficient_points() {
        let err = Track::parse("t.track", "0 0\n0 100\n100 100\n").unwrap_err();
        assert!(matches!(
            err,
            TrackError::InsufficientTrackPoints { found: 3 }
        ));
    }

    #[test]
    fn test_hexagon_builtin_loads() {
        let track = Track::hexagon();
        assert!(track.len() >= MIN_TRACK_POINTS);
    }

    #[test]
    fn test_track_round_trip() {
        let track = Track::hexagon();
        let reparsed = Track::parse("copy.track", &track.to_track_string()).unwrap();
        assert_eq!(track, reparsed);
    }

    proptest! {
        #[test]
        fn prop_write_parse_round_trip(
            raw in prop::collection::vec(
                (-1.0e6f32..1.0e6, -1.0e6f32..1.0e6, -1.0e3f32..1.0e3),
                0..32,
            )
        ) {
            let points: Vec<Vec3> =
                raw.iter().map(|&(x, y, z)| Vec3::new(x, y, z)).collect();
            let parsed = parse_points("prop.track", &points_to_string(&points)).unwrap();
            prop_assert_eq!(parsed, points);
        }

        #[test]
        fn prop_filter_is_idempotent(
            raw in prop::collection::vec((-5i32..5, -5i32..5), 0..16)
        ) {
            let mut once: Vec<Vec3> = raw
                .iter()
                .map(|&(x, y)| Vec3::new(x as f32, y as f32, 0.0))
                .collect();
            filter_redundant(&mut once);
            let mut twice = once.clone();
            filter_redundant(&mut twice);
            prop_assert_eq!(once, twice);
        }
    }
}
