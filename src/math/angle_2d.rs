use std::f64::consts::{PI, TAU};

use super::Vector2;

/// Modulus whose result takes the sign of the divisor.
#[must_use]
pub fn divisor_sign_modulus(dividend: f64, divisor: f64) -> f64 {
    ((dividend % divisor) + divisor) % divisor
}

/// Smallest signed rotation taking angle `source` to angle `target`, in `[-PI, PI)`.
#[must_use]
pub fn signed_angle_between_angles(target: f64, source: f64) -> f64 {
    divisor_sign_modulus(target - source + PI, TAU) - PI
}

/// Signed angle from `v1` to `v2`. Counter-clockwise is positive.
#[must_use]
pub fn signed_angle_between_vectors(v1: &Vector2, v2: &Vector2) -> f64 {
    (v1.x * v2.y - v1.y * v2.x).atan2(v1.dot(v2))
}

/// Unsigned angle between `v1` and `v2`.
#[must_use]
pub fn angle_between_vectors(v1: &Vector2, v2: &Vector2) -> f64 {
    signed_angle_between_vectors(v1, v2).abs()
}

/// Heading of a ground-plane direction, measured from `+x`.
#[must_use]
pub fn heading(v: &Vector2) -> f64 {
    v.y.atan2(v.x)
}
