use tracing::warn;

use crate::geometry::spline::extract_range;
use crate::geometry::Pose;
use crate::math::TOLERANCE;

/// Removes the parts of a road covered by the intersections at its ends.
///
/// `outgoing` is the crop index at the road's start, `incoming` the crop
/// index at its end counted back from the last sample. Both are taken against
/// the uncropped samples.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn crop_road(samples: &[Pose], outgoing: Option<f64>, incoming: Option<f64>) -> Vec<Pose> {
    if samples.len() < 2 {
        return samples.to_vec();
    }
    let last = (samples.len() - 1) as f64;
    let start = outgoing.unwrap_or(0.0).max(0.0);
    let end = last - incoming.unwrap_or(0.0).max(0.0);
    if end - start < TOLERANCE {
        warn!(start, end, "intersections overlap the whole road, leaving it uncropped");
        return samples.to_vec();
    }
    extract_range(samples, start, end)
}
