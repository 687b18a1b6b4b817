use crate::math::{approx_eq, xz, Point3, Vector3, TOLERANCE};

use super::pose::{look_rotation, slerp, Pose};

/// Ease-in-ease-out remapping of a linear factor in `[0, 1]`.
#[must_use]
pub fn bezier_blend(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Sum of the 3D distances between consecutive samples.
#[must_use]
pub fn spline_length(spline: &[Pose]) -> f64 {
    spline
        .windows(2)
        .map(|w| (w[1].position - w[0].position).norm())
        .sum()
}

/// Cumulative ground-plane distance from the first sample to every sample.
#[must_use]
pub fn spline_distances(spline: &[Pose]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(spline.len());
    let mut total = 0.0;
    for (i, pose) in spline.iter().enumerate() {
        if i > 0 {
            total += (pose.xz() - spline[i - 1].xz()).norm();
        }
        distances.push(total);
    }
    distances
}

/// Reverses sample order and turns every sample around.
#[must_use]
pub fn reverse_spline(spline: &[Pose]) -> Vec<Pose> {
    spline.iter().rev().map(Pose::reversed).collect()
}

/// Normalizes cumulative distances to `[0, 1]`.
fn normalized_distances(spline: &[Pose]) -> Vec<f64> {
    let mut distances = spline_distances(spline);
    let total = distances.last().copied().unwrap_or(0.0);
    if total > TOLERANCE {
        for d in &mut distances {
            *d /= total;
        }
    }
    distances
}

/// Interpolates `spline` at normalized distance `target`, advancing the
/// segment cursor `j`.
fn sample_normalized(spline: &[Pose], distances: &[f64], j: &mut usize, target: f64) -> Pose {
    let last = distances.len() - 1;
    while *j < last && distances[*j] < target {
        *j += 1;
    }
    let prev = distances[*j - 1];
    let curr = distances[*j];
    let span = curr - prev;
    let t = if span > 0.0 { (target - prev) / span } else { 0.0 };
    spline[*j - 1].lerp(&spline[*j], t.clamp(0.0, 1.0))
}

/// Resamples `original` at the normalized distances of `reference`.
///
/// The result has as many samples as `reference` and shares the endpoints of
/// `original`.
#[must_use]
pub fn remap_spline(original: &[Pose], reference: &[Pose]) -> Vec<Pose> {
    if original.len() < 2 || reference.len() < 2 {
        return original.to_vec();
    }
    let distances = normalized_distances(original);
    let reference_distances = normalized_distances(reference);

    let n = reference.len();
    let mut remapped = Vec::with_capacity(n);
    remapped.push(original[0]);
    let mut j = 1;
    for &target in &reference_distances[1..n - 1] {
        remapped.push(sample_normalized(original, &distances, &mut j, target));
    }
    remapped.push(original[original.len() - 1]);
    remapped
}

/// Resamples a spline into `num_samples` evenly spaced samples.
///
/// A looped spline treats the first sample as following the last one and does
/// not repeat it.
#[must_use]
pub fn evenly_remap_spline(original: &[Pose], num_samples: usize, looped: bool) -> Vec<Pose> {
    if original.is_empty() || num_samples == 0 {
        return Vec::new();
    }
    if original.len() < 2 || num_samples == 1 {
        return vec![original[0]];
    }

    let mut source = original.to_vec();
    if looped {
        source.push(original[0]);
    }
    let distances = normalized_distances(&source);

    let divisor = if looped { num_samples } else { num_samples - 1 };
    let mut remapped = Vec::with_capacity(num_samples);
    remapped.push(source[0]);
    let mut j = 1;
    #[allow(clippy::cast_precision_loss)]
    for i in 1..divisor {
        let target = i as f64 / divisor as f64;
        remapped.push(sample_normalized(&source, &distances, &mut j, target));
    }
    if !looped {
        remapped.push(source[source.len() - 1]);
    }
    remapped
}

/// Resamples a spline so consecutive samples are roughly `spacing` apart.
#[must_use]
pub fn evenly_distribute_spline(original: &[Pose], spacing: f64, looped: bool) -> Vec<Pose> {
    if spacing <= 0.0 {
        return original.to_vec();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let quotient = (spline_length(original) / spacing) as usize;
    let count = if looped {
        quotient.saturating_sub(1)
    } else {
        quotient
    };
    evenly_remap_spline(original, count.max(2), looped)
}

/// Samples `reference` at each ground-plane distance in `distances`.
///
/// `distances` must be sorted and no longer than the spline.
#[must_use]
pub fn sample_spline_at_distances(reference: &[Pose], distances: &[f64]) -> Vec<Pose> {
    if reference.len() < 2 {
        return reference
            .first()
            .map(|p| vec![*p; distances.len()])
            .unwrap_or_default();
    }
    let normalized = normalized_distances(reference);
    let total = spline_distances(reference).last().copied().unwrap_or(0.0);
    let mut j = 1;
    distances
        .iter()
        .map(|d| {
            let target = if total > TOLERANCE { d / total } else { 0.0 };
            sample_normalized(reference, &normalized, &mut j, target)
        })
        .collect()
}

/// Offsets every sample by `offset`, expressed in each sample's local frame.
#[must_use]
pub fn offset_spline(spline: &[Pose], offset: &Vector3) -> Vec<Pose> {
    spline.iter().map(|p| p.offset(offset)).collect()
}

/// Derives orientations for a path of positions.
///
/// Interior samples face halfway between their incoming and outgoing
/// segments.
#[must_use]
pub fn positions_to_poses(path: &[Point3], looped: bool) -> Vec<Pose> {
    let n = path.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![Pose::from_position(path[0])],
        _ => {}
    }

    let mut poses = Vec::with_capacity(n);
    poses.push(Pose::from_position(path[0]));
    for i in 1..n - 1 {
        let prev = look_rotation(&(path[i] - path[i - 1]));
        let next = look_rotation(&(path[i + 1] - path[i]));
        poses.push(Pose::new(path[i], slerp(&prev, &next, 0.5)));
    }
    poses.push(Pose::from_position(path[n - 1]));

    let last = n - 1;
    if looped && n > 2 {
        let r0 = look_rotation(&(path[last] - path[last - 1]));
        let r1 = look_rotation(&(path[0] - path[last]));
        let r2 = look_rotation(&(path[1] - path[0]));
        poses[last].rotation = slerp(&r0, &r1, 0.5);
        poses[0].rotation = slerp(&r1, &r2, 0.5);
    } else {
        poses[0].rotation = look_rotation(&(path[1] - path[0]));
        poses[last].rotation = look_rotation(&(path[last] - path[last - 1]));
    }
    poses
}

/// Drops points closer than `min_distance` to the previously kept point.
#[must_use]
pub fn remove_overlapping_points(points: &[Point3], min_distance: f64) -> Vec<Point3> {
    let min_sq = min_distance * min_distance;
    let mut kept: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        match kept.last() {
            Some(last) if (p - last).norm_squared() <= min_sq => {}
            _ => kept.push(*p),
        }
    }
    kept
}

/// Samples of `spline` between fractional indices `start` and `end`.
///
/// Interpolated end samples are emitted unless the index already sits on a
/// whole sample.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn extract_range(spline: &[Pose], start: f64, end: f64) -> Vec<Pose> {
    let last = spline.len() - 1;
    let first_whole = (start.floor() as usize + 1).min(last);
    let last_whole = (end.ceil() as usize).saturating_sub(1);

    let mut samples = Vec::new();
    if !approx_eq(start, first_whole as f64) {
        let t = start - (first_whole - 1) as f64;
        samples.push(spline[first_whole - 1].lerp(&spline[first_whole], t));
    }
    if first_whole <= last_whole {
        samples.extend_from_slice(&spline[first_whole..=last_whole]);
    }
    if !approx_eq(end, last_whole as f64) && last_whole < last {
        let t = end - last_whole as f64;
        samples.push(spline[last_whole].lerp(&spline[last_whole + 1], t));
    }
    samples
}

/// Interpolated pose at fractional sample index `index`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn pose_at_index(spline: &[Pose], index: f64) -> Pose {
    let last = spline.len() - 1;
    let clamped = index.clamp(0.0, last as f64);
    let i = (clamped.floor() as usize).min(last.saturating_sub(1));
    let t = clamped - i as f64;
    if approx_eq(t, 0.0) || last == 0 {
        return spline[i];
    }
    spline[i].lerp(&spline[i + 1], t)
}

/// Appends poses while keeping consecutive samples no further apart (on the
/// ground plane) than a maximum distance.
#[derive(Debug, Clone)]
pub struct SplineInterpolator {
    samples: Vec<Pose>,
    max_distance: f64,
}

impl SplineInterpolator {
    /// Creates an empty interpolator.
    #[must_use]
    pub fn new(max_distance: f64) -> Self {
        Self {
            samples: Vec::new(),
            max_distance,
        }
    }

    /// Appends `pose`, first inserting interpolated poses if the gap from the
    /// last sample is too wide.
    pub fn add(&mut self, pose: Pose) {
        if let Some(last) = self.samples.last().copied() {
            let dist = (xz(&pose.position) - xz(&last.position)).norm();
            if self.max_distance > 0.0 && dist > self.max_distance {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let count = (dist / self.max_distance) as usize;
                #[allow(clippy::cast_precision_loss)]
                let step = 1.0 / (count + 1) as f64;
                for k in 1..=count {
                    #[allow(clippy::cast_precision_loss)]
                    self.samples.push(last.lerp(&pose, step * k as f64));
                }
            }
        }
        self.samples.push(pose);
    }

    /// Appends `poses` as given, without filling gaps.
    pub fn extend_exact(&mut self, poses: &[Pose]) {
        self.samples.extend_from_slice(poses);
    }

    /// Number of samples added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last sample, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Pose> {
        self.samples.last()
    }

    /// Consumes the interpolator, returning its samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<Pose> {
        self.samples
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn straight_line(xs: &[f64]) -> Vec<Pose> {
        let points: Vec<Point3> = xs.iter().map(|&x| Point3::new(x, 0.0, 0.0)).collect();
        positions_to_poses(&points, false)
    }

    #[test]
    fn reverse_twice_is_identity() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.5, 2.0),
            Point3::new(3.0, 0.0, 2.5),
            Point3::new(4.0, 1.0, 5.0),
            Point3::new(2.0, 0.0, 7.0),
        ];
        let spline = positions_to_poses(&points, false);
        let twice = reverse_spline(&reverse_spline(&spline));
        assert_eq!(twice.len(), spline.len());
        for (a, b) in spline.iter().zip(&twice) {
            assert!((a.position - b.position).norm() < TOLERANCE);
            assert!(a.rotation.angle_to(&b.rotation) < 1e-6);
        }
    }

    #[test]
    fn reverse_flips_forward() {
        let spline = straight_line(&[0.0, 1.0, 2.0]);
        let reversed = reverse_spline(&spline);
        assert!((reversed[0].position.x - 2.0).abs() < TOLERANCE);
        assert!((reversed[1].forward() + Vector3::x()).norm() < 1e-6);
    }

    #[test]
    fn evenly_remap_preserves_length_and_endpoints() {
        let spline = straight_line(&[0.0, 0.3, 0.5, 2.0, 2.1, 7.0, 10.0]);
        let remapped = evenly_remap_spline(&spline, 11, false);
        assert_eq!(remapped.len(), 11);
        assert!((spline_length(&remapped) - spline_length(&spline)).abs() < 1e-6);
        assert_eq!(remapped[0].position, spline[0].position);
        assert_eq!(remapped[10].position, spline[6].position);
        for (i, pose) in remapped.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = i as f64;
            assert!((pose.position.x - expected).abs() < 1e-6, "i={i} x={}", pose.position.x);
        }
    }

    #[test]
    fn evenly_remap_looped_square() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 4.0),
            Point3::new(0.0, 0.0, 4.0),
        ];
        let spline = positions_to_poses(&points, true);
        let remapped = evenly_remap_spline(&spline, 8, true);
        assert_eq!(remapped.len(), 8);
        assert!((remapped[1].position - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-6);
        assert!((remapped[7].position - Point3::new(0.0, 0.0, 2.0)).norm() < 1e-6);
    }

    #[test]
    fn remap_uses_reference_spacing() {
        let original = straight_line(&[0.0, 10.0]);
        let reference = straight_line(&[0.0, 1.0, 5.0]);
        let remapped = remap_spline(&original, &reference);
        assert_eq!(remapped.len(), 3);
        assert!((remapped[1].position.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn sample_at_distances() {
        let spline = straight_line(&[0.0, 4.0, 10.0]);
        let samples = sample_spline_at_distances(&spline, &[0.0, 2.5, 9.0]);
        let xs: Vec<f64> = samples.iter().map(|p| p.position.x).collect();
        assert!((xs[0]).abs() < 1e-6);
        assert!((xs[1] - 2.5).abs() < 1e-6);
        assert!((xs[2] - 9.0).abs() < 1e-6);
    }

    #[test]
    fn offset_is_in_local_frame() {
        let spline = straight_line(&[0.0, 1.0]);
        let offset = offset_spline(&spline, &Vector3::new(2.0, 0.0, 0.0));
        // Travelling along +x, local right is -z.
        assert!((offset[0].position - Point3::new(0.0, 0.0, -2.0)).norm() < 1e-6);
    }

    #[test]
    fn overlapping_points_removed() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.05, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.55, 0.0, 0.0),
            Point3::new(0.65, 0.0, 0.0),
        ];
        let kept = remove_overlapping_points(&points, 0.1);
        assert_eq!(kept.len(), 3);
        assert!((kept[2].x - 0.65).abs() < TOLERANCE);
    }

    #[test]
    fn interpolator_fills_gaps() {
        let mut interpolator = SplineInterpolator::new(1.0);
        interpolator.add(Pose::from_position(Point3::origin()));
        interpolator.add(Pose::from_position(Point3::new(3.5, 0.0, 0.0)));
        let samples = interpolator.into_samples();
        assert_eq!(samples.len(), 5);
        for w in samples.windows(2) {
            assert!((w[1].position - w[0].position).norm() <= 1.0 + TOLERANCE);
        }
    }

    #[test]
    fn pose_at_fractional_index() {
        let spline = straight_line(&[0.0, 2.0, 6.0]);
        assert!((pose_at_index(&spline, 1.5).position.x - 4.0).abs() < 1e-9);
        assert!((pose_at_index(&spline, 2.0).position.x - 6.0).abs() < 1e-9);
    }

    #[test]
    fn blend_endpoints() {
        assert!(bezier_blend(0.0).abs() < TOLERANCE);
        assert!((bezier_blend(1.0) - 1.0).abs() < TOLERANCE);
        assert!((bezier_blend(0.5) - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn extract_fractional_range() {
        let spline = positions_to_poses(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 2.0),
                Point3::new(0.0, 0.0, 3.0),
            ],
            false,
        );
        let range = extract_range(&spline, 0.5, 2.25);
        let z: Vec<f64> = range.iter().map(|p| p.position.z).collect();
        assert_eq!(z.len(), 4);
        for (actual, expected) in z.iter().zip([0.5, 1.0, 2.0, 2.25]) {
            assert!((actual - expected).abs() < 1e-9, "z={z:?}");
        }

        let whole = extract_range(&spline, 0.0, 3.0);
        assert_eq!(whole.len(), 4);
        assert!((whole[3].position.z - 3.0).abs() < 1e-9);

        let inside = extract_range(&spline, 1.25, 1.75);
        assert_eq!(inside.len(), 2);
    }
}
