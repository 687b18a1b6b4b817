pub mod angle_2d;
pub mod distance_2d;
pub mod intersect_2d;

/// 2D point type. Ground-plane points use `(x, z)` of the 3D frame.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Unit quaternion used for pose orientations.
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-5;

/// World up axis (`+y`).
#[must_use]
pub fn up() -> Vector3 {
    Vector3::y()
}

/// Projects a 3D point onto the ground plane.
#[must_use]
pub fn xz(p: &Point3) -> Point2 {
    Point2::new(p.x, p.z)
}

/// Projects a 3D vector onto the ground plane.
#[must_use]
pub fn xz_vec(v: &Vector3) -> Vector2 {
    Vector2::new(v.x, v.z)
}

/// Lifts a ground-plane point back to 3D at height `y`.
#[must_use]
pub fn from_xz(p: &Point2, y: f64) -> Point3 {
    Point3::new(p.x, y, p.y)
}

/// Returns `true` if `a` and `b` differ by less than [`TOLERANCE`].
#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < TOLERANCE
}

/// Component-wise approximate equality of 2D points.
#[must_use]
pub fn approx_eq_2d(a: &Point2, b: &Point2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// Component-wise approximate equality of 3D points.
#[must_use]
pub fn approx_eq_3d(a: &Point3, b: &Point3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

/// `a <= b` within [`TOLERANCE`].
#[must_use]
pub fn approx_le(a: f64, b: f64) -> bool {
    a - b < TOLERANCE
}

/// `a >= b` within [`TOLERANCE`].
#[must_use]
pub fn approx_ge(a: f64, b: f64) -> bool {
    a - b > -TOLERANCE
}
