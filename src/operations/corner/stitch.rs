use crate::error::Result;
use crate::geometry::{Pose, SplineInterpolator};
use crate::math::{approx_eq, approx_eq_3d};
use crate::network::{CornerData, CornerId, IntersectionId, RoadConnection, RoadNetworkStore};

/// Outline and crop indices of one corner.
#[derive(Debug, Clone)]
pub struct CornerOutline {
    pub corner: CornerId,
    pub samples: Vec<Pose>,
    pub left_crop_index: f64,
    pub right_crop_index: f64,
}

/// Outline of every corner of an intersection plus how much of each
/// connected road the intersection consumes.
#[derive(Debug, Clone, Default)]
pub struct StitchedIntersection {
    pub corners: Vec<CornerOutline>,
    /// Crop index per road end, counted from the intersection.
    pub road_crops: Vec<(RoadConnection, f64)>,
}

/// Joins each corner's arc with the stretches of road edge that neighbouring
/// corners consume.
///
/// Adjacent corners share a road. Whichever corner reaches further along it
/// decides where the road is cropped, and the other corner extends its
/// outline along the road edge to meet that point.
#[derive(Debug)]
pub struct StitchIntersectionOutline {
    intersection: IntersectionId,
    samples_per_meter: f64,
}

impl StitchIntersectionOutline {
    #[must_use]
    pub fn new(intersection: IntersectionId, samples_per_meter: f64) -> Self {
        Self {
            intersection,
            samples_per_meter,
        }
    }

    /// Stitches every corner of the intersection.
    ///
    /// # Errors
    ///
    /// Returns an error if the intersection or one of its corners is missing.
    pub fn execute(&self, store: &RoadNetworkStore) -> Result<StitchedIntersection> {
        let ids = &store.intersection(self.intersection)?.corners;
        let corners = ids
            .iter()
            .map(|&id| store.corner(id))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let n = corners.len();

        let mut stitched = StitchedIntersection::default();
        for (i, curr) in corners.iter().enumerate() {
            let prev = corners[(i + n - 1) % n];
            let next = corners[(i + 1) % n];

            let mut interpolator = SplineInterpolator::new(2.0 / self.samples_per_meter);

            let right_crop = curr.tangent_right_index.max(prev.tangent_left_index);
            stitched.road_crops.push((curr.right_road, right_crop));
            add_right_edge(&mut interpolator, curr, right_crop);

            interpolator.extend_exact(&curr.arc);

            let left_crop = curr.tangent_left_index.max(next.tangent_right_index);
            add_left_edge(&mut interpolator, curr, left_crop);

            stitched.corners.push(CornerOutline {
                corner: ids[i],
                samples: interpolator.into_samples(),
                left_crop_index: left_crop,
                right_crop_index: right_crop,
            });
        }
        Ok(stitched)
    }
}

/// Right edge samples between the crop point and the corner's own tangent.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn add_right_edge(interpolator: &mut SplineInterpolator, corner: &CornerData, crop: f64) {
    if corner.tangent_right_index >= crop || approx_eq(corner.tangent_right_index, crop) {
        return;
    }
    let edge = &corner.right_edge;
    let last = (edge.len() - 1) as f64;
    let first = last - crop;
    let tangent = last - corner.tangent_right_index;
    let start = first.ceil() as usize;
    let end = tangent as usize;

    if !approx_eq(first, start as f64) && start > 0 {
        interpolator.add(edge[start].lerp(&edge[start - 1], start as f64 - first));
    }
    for pose in &edge[start..end.max(start)] {
        interpolator.add(*pose);
    }
}

/// Left edge samples between the corner's own tangent and the crop point.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn add_left_edge(interpolator: &mut SplineInterpolator, corner: &CornerData, crop: f64) {
    if corner.tangent_left_index >= crop || approx_eq(corner.tangent_left_index, crop) {
        return;
    }
    let edge = &corner.left_edge;
    let crop_floor = crop as usize;
    let first = corner.tangent_left_index.ceil() as usize + 1;

    for pose in edge.iter().take(crop_floor).skip(first) {
        interpolator.add(*pose);
    }
    if crop_floor + 1 >= edge.len() {
        return;
    }
    let last = edge[crop_floor].lerp(&edge[crop_floor + 1], crop - crop_floor as f64);
    let duplicate = interpolator
        .last()
        .is_some_and(|p| approx_eq_3d(&p.position, &last.position));
    if !duplicate {
        interpolator.add(last);
    }
}
