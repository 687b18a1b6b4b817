use std::f64::consts::PI;

use crate::math::{up, xz, Point2, Point3, UnitQuaternion, Vector3, TOLERANCE};

/// A position and orientation along a spline.
///
/// Local frame: `+z` is forward, `+y` is up and `+x` points to the right of
/// the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3,
    pub rotation: UnitQuaternion,
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_position(Point3::origin())
    }
}

impl Pose {
    /// Creates a new pose.
    #[must_use]
    pub fn new(position: Point3, rotation: UnitQuaternion) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated pose at `position`.
    #[must_use]
    pub fn from_position(position: Point3) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Local `+z` in world space.
    #[must_use]
    pub fn forward(&self) -> Vector3 {
        self.rotation * Vector3::z()
    }

    /// Local `+y` in world space.
    #[must_use]
    pub fn up(&self) -> Vector3 {
        self.rotation * Vector3::y()
    }

    /// Local `+x` in world space.
    #[must_use]
    pub fn right(&self) -> Vector3 {
        self.rotation * Vector3::x()
    }

    /// Ground-plane position.
    #[must_use]
    pub fn xz(&self) -> Point2 {
        xz(&self.position)
    }

    /// Maps a point given in this pose's local frame to world space.
    #[must_use]
    pub fn transform_point(&self, local: &Vector3) -> Point3 {
        self.position + self.rotation * local
    }

    /// Positions are interpolated linearly, rotations with a normalized lerp.
    #[must_use]
    pub fn lerp(&self, other: &Pose, t: f64) -> Pose {
        Pose {
            position: self.position + (other.position - self.position) * t,
            rotation: nlerp(&self.rotation, &other.rotation, t),
        }
    }

    /// Turns the pose around its local up axis, keeping its position.
    #[must_use]
    pub fn reversed(&self) -> Pose {
        Pose {
            position: self.position,
            rotation: self.rotation * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI),
        }
    }

    /// Returns this pose moved by `offset` expressed in its local frame.
    #[must_use]
    pub fn offset(&self, offset: &Vector3) -> Pose {
        Pose {
            position: self.transform_point(offset),
            rotation: self.rotation,
        }
    }
}

/// Rotation whose forward axis points along `direction` with world up kept up.
///
/// Zero-length directions yield the identity. Vertical directions fall back to
/// `+z` as the reference up axis.
#[must_use]
pub fn look_rotation(direction: &Vector3) -> UnitQuaternion {
    let len = direction.norm();
    if len < TOLERANCE {
        return UnitQuaternion::identity();
    }
    let dir = direction / len;
    if dir.cross(&up()).norm() < TOLERANCE {
        return UnitQuaternion::face_towards(&dir, &Vector3::z());
    }
    UnitQuaternion::face_towards(&dir, &up())
}

/// Normalized lerp through the shorter arc.
#[must_use]
pub fn nlerp(a: &UnitQuaternion, b: &UnitQuaternion, t: f64) -> UnitQuaternion {
    let qa = a.into_inner();
    let mut qb = b.into_inner();
    if qa.dot(&qb) < 0.0 {
        qb = -qb;
    }
    let q = qa.lerp(&qb, t);
    if q.norm() < TOLERANCE {
        return *a;
    }
    UnitQuaternion::new_normalize(q)
}

/// Spherical interpolation, falling back to [`nlerp`] for opposite rotations.
#[must_use]
pub fn slerp(a: &UnitQuaternion, b: &UnitQuaternion, t: f64) -> UnitQuaternion {
    a.try_slerp(b, t, TOLERANCE)
        .unwrap_or_else(|| nlerp(a, b, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn look_rotation_maps_forward() {
        let dir = Vector3::new(1.0, 0.0, 1.0).normalize();
        let pose = Pose::new(Point3::origin(), look_rotation(&dir));
        assert!((pose.forward() - dir).norm() < TOLERANCE);
        assert!((pose.up() - up()).norm() < TOLERANCE);
    }

    #[test]
    fn right_is_clockwise_of_forward() {
        let pose = Pose::new(Point3::origin(), look_rotation(&Vector3::z()));
        assert!((pose.right() - Vector3::x()).norm() < TOLERANCE);
        let pose = Pose::new(Point3::origin(), look_rotation(&Vector3::x()));
        assert!((pose.right() + Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn reversed_pose_faces_backwards() {
        for dir in [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, -1.0, -1.0),
        ] {
            let dir = dir.normalize();
            let pose = Pose::new(Point3::new(1.0, 2.0, 3.0), look_rotation(&dir));
            let expected = look_rotation(&-dir);
            let reversed = pose.reversed();
            assert!(reversed.rotation.angle_to(&expected) < 1e-6, "dir={dir:?}");
            assert_eq!(reversed.position, pose.position);
        }
    }

    #[test]
    fn lerp_halfway() {
        let a = Pose::new(Point3::new(0.0, 0.0, 0.0), look_rotation(&Vector3::z()));
        let b = Pose::new(Point3::new(2.0, 0.0, 0.0), look_rotation(&Vector3::x()));
        let mid = a.lerp(&b, 0.5);
        assert!((mid.position - Point3::new(1.0, 0.0, 0.0)).norm() < TOLERANCE);
        let yaw = mid.rotation.angle_to(&a.rotation);
        assert!((yaw - FRAC_PI_2 / 2.0).abs() < 1e-6, "yaw={yaw}");
    }

    #[test]
    fn slerp_opposite_rotations_does_not_panic() {
        let a = look_rotation(&Vector3::z());
        let b = look_rotation(&-Vector3::z());
        let mid = slerp(&a, &b, 0.5);
        assert!(mid.quaternion().norm().is_finite());
    }
}
