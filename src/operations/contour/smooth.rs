use crate::geometry::spline::{bezier_blend, spline_distances};
use crate::geometry::{look_rotation, Pose};
use crate::math::Vector3;

/// Eases the heights of a corner outline between its two ends and re-derives
/// interior orientations from the new 3D path.
#[must_use]
pub fn smooth_corner_outline(samples: &[Pose]) -> Vec<Pose> {
    let n = samples.len();
    if n <= 2 {
        return samples.to_vec();
    }
    let distances = spline_distances(samples);
    let total = distances[n - 1];
    let first_y = samples[0].position.y;
    let last_y = samples[n - 1].position.y;

    let mut smoothed = samples.to_vec();
    if total > 0.0 {
        for (pose, d) in smoothed.iter_mut().zip(&distances).take(n - 1).skip(1) {
            pose.position.y = first_y + (last_y - first_y) * bezier_blend(d / total);
        }
    }

    for i in 1..n - 1 {
        let v1 = (smoothed[i].position - smoothed[i - 1].position)
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        let v2 = (smoothed[i + 1].position - smoothed[i].position)
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        smoothed[i].rotation = look_rotation(&(v1 + v2));
    }
    smoothed
}
