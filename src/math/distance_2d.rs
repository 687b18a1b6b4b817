use super::{Point2, Vector2, TOLERANCE};

/// Rotates `v` by `-angle`.
fn rotate_back(v: &Vector2, angle: f64) -> Vector2 {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(cos * v.x + sin * v.y, -sin * v.x + cos * v.y)
}

/// Returns `(segment_length, test_point)` with the segment `p1 -> p2` rotated
/// onto the positive x axis.
fn to_segment_frame(p1: &Point2, p2: &Point2, test: &Point2) -> (f64, Vector2) {
    let seg = p2 - p1;
    let angle = seg.y.atan2(seg.x);
    let seg = rotate_back(&seg, angle);
    (seg.x, rotate_back(&(test - p1), angle))
}

/// Minimum distance from `test` to the segment `p1 -> p2`.
#[must_use]
pub fn point_distance_from_segment(p1: &Point2, p2: &Point2, test: &Point2) -> f64 {
    let (length, t) = to_segment_frame(p1, p2, test);
    if t.x < 0.0 || t.x > length {
        return (t - Vector2::new(length, 0.0)).norm().min(t.norm());
    }
    t.y.abs()
}

/// Returns `true` if `test` lies on the segment `p1 -> p2`.
#[must_use]
pub fn is_point_on_segment(p1: &Point2, p2: &Point2, test: &Point2) -> bool {
    let (length, t) = to_segment_frame(p1, p2, test);
    t.x >= 0.0 && t.x <= length && t.y.abs() < TOLERANCE
}

/// Interpolation factor of `x` between `a` and `b`.
///
/// `x` is expected to lie on the segment.
#[must_use]
pub fn unlerp(a: &Point2, b: &Point2, x: &Point2) -> f64 {
    (a - x).norm() / (a - b).norm()
}
