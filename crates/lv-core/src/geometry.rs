//! Plane geometry helpers over logical canvas coordinates.
//!
//! All inputs are in logical units (pixels at zoom 1). Real-world lengths
//! are derived later through [`crate::scale::Scale`].

use kurbo::{Point, Rect, Vec2};

/// Straight-line distance between two points.
pub fn segment_length(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Sum of segment lengths along an ordered polyline. Zero for < 2 points.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab: Vec2 = b - a;
    let len_sq = ab.hypot2();
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Shortest distance from `p` to any segment of the polyline.
/// Returns `None` when the polyline has no segments.
pub fn distance_to_polyline(p: Point, points: &[Point]) -> Option<f64> {
    points
        .windows(2)
        .map(|w| point_segment_distance(p, w[0], w[1]))
        .min_by(f64::total_cmp)
}

/// Stretch segment `index` (from `points[index]` to `points[index + 1]`)
/// to `length` by moving its end point along the current direction. Later
/// points stay where they are. Returns `false` for a missing or zero-length
/// segment or a length that is not a positive number.
pub fn set_segment_length(points: &mut [Point], index: usize, length: f64) -> bool {
    if !(length.is_finite() && length > 0.0) || index + 1 >= points.len() {
        return false;
    }
    let start = points[index];
    let dir = points[index + 1] - start;
    let current = dir.hypot();
    if current < 1e-9 {
        return false;
    }
    points[index + 1] = start + dir * (length / current);
    true
}

/// Heading of the vector `from → to` in degrees, in `(-180, 180]`.
pub fn heading_deg(from: Point, to: Point) -> f64 {
    (to - from).atan2().to_degrees()
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unsigned turn between an incoming and outgoing heading, folded into `[0, 180]`.
pub fn turn_angle_deg(incoming_deg: f64, outgoing_deg: f64) -> f64 {
    let delta = normalize_deg(outgoing_deg - incoming_deg);
    if delta > 180.0 { 360.0 - delta } else { delta }
}

/// Axis-aligned box test: `|p - anchor| < radius` on both axes.
pub fn within_box(anchor: Point, p: Point, radius: f64) -> bool {
    (anchor.x - p.x).abs() < radius && (anchor.y - p.y).abs() < radius
}

/// Point-in-ellipse test for the ellipse inscribed in `rect`.
pub fn ellipse_contains(rect: Rect, p: Point) -> bool {
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = rect.center();
    let nx = (p.x - c.x) / rx;
    let ny = (p.y - c.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Point-in-triangle test (either winding), edges inclusive.
pub fn triangle_contains(a: Point, b: Point, c: Point, p: Point) -> bool {
    let d1 = (p - b).cross(a - b);
    let d2 = (p - c).cross(b - c);
    let d3 = (p - a).cross(c - a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
