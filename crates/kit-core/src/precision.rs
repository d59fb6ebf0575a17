//! Fixed-precision snapping and the tolerance comparisons built on it
//!
//! Interface origins, cell coordinates and solver angles are snapped to
//! [`ROUND_TO_DIGITS`] decimals when computed, and every later equality test
//! goes through the helpers here rather than through `==`.

use glam::DVec3;

use crate::constants::{EPSILON, ROUND_TO_DIGITS};

/// Round `value` to `digits` decimal places
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    let rounded = (value * scale).round() / scale;
    // Avoid carrying a negative zero into keys and formatted output
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Round to the crate-wide precision
pub fn snap(value: f64) -> f64 {
    round_to(value, ROUND_TO_DIGITS)
}

/// Round every component of a vector to the crate-wide precision
pub fn snap_vec(v: DVec3) -> DVec3 {
    DVec3::new(snap(v.x), snap(v.y), snap(v.z))
}

/// Tolerance equality for scalars
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Tolerance equality for vectors and points, component-wise
pub fn vec_approx_eq(a: DVec3, b: DVec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

/// Whether two non-zero vectors point along the same line (either sense)
pub fn is_parallel(a: DVec3, b: DVec3) -> bool {
    if vec_approx_eq(a, DVec3::ZERO) || vec_approx_eq(b, DVec3::ZERO) {
        return false;
    }
    let cross = a.normalize().cross(b.normalize());
    vec_approx_eq(snap_vec(cross), DVec3::ZERO)
}

/// Angle between two vectors in radians, snapped
pub fn snapped_angle(a: DVec3, b: DVec3) -> f64 {
    snap(a.angle_between(b)).abs()
}

/// Whether any component of `v` equals `target` within tolerance
pub fn contains_component(v: DVec3, target: f64) -> bool {
    v.to_array().iter().any(|c| approx_eq(*c, target))
}
