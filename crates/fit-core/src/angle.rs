//! Joint angle geometry

use crate::landmark::Point2;

/// Interior angle at `b` between rays `b→a` and `b→c`, in degrees.
///
/// Uses the difference of the two ray headings; results above 180° are
/// reflected so the return value always lies in `[0, 180]`. Coincident
/// points are not special-cased: `atan2(0, 0)` evaluates to 0.
pub fn compute_angle(a: Point2, b: Point2, c: Point2) -> f64 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = (radians * 180.0 / std::f64::consts::PI).abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Heading of the segment `from→to` relative to the +x axis, in degrees
/// (`(-180, 180]`). Used for torso lean.
pub fn inclination_degrees(from: Point2, to: Point2) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

/// Deviation of the segment `from→to` from vertical, in degrees (`[0, 90]`).
pub fn lean_from_vertical(from: Point2, to: Point2) -> f64 {
    (90.0 - inclination_degrees(from, to).abs()).abs()
}
