//! Polar angle helpers.

use std::f64::consts::TAU;

/// Counterclockwise angle of the vector `(dx, dy)` from the positive x axis,
/// in `[0, 2π)`.
///
/// `(0, 0)` yields `0.0`, which is what `atan2(0, 0)` returns; coincident
/// points therefore sort first rather than erroring.
#[inline]
pub fn polar_angle(dx: f64, dy: f64) -> f64 {
    let angle = dy.atan2(dx);
    if angle < 0.0 {
        // tiny negative angles round up to exactly 2π
        let shifted = angle + TAU;
        if shifted >= TAU { 0.0 } else { shifted }
    } else if angle == 0.0 {
        // folds -0.0
        0.0
    } else {
        angle
    }
}

/// Angle from `from` toward `to`.
#[inline]
pub fn angle_between(from: (f64, f64), to: (f64, f64)) -> f64 {
    polar_angle(to.0 - from.0, to.1 - from.1)
}
