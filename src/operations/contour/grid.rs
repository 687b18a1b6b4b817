use crate::error::{GeometryError, Result};
use crate::geometry::spline::{evenly_remap_spline, extract_range, reverse_spline};
use crate::geometry::Pose;
use crate::network::{ContourGrid, CornerId, RoadDirection, RoadNetworkStore};

/// Centerline samples of a road inside the intersection, up to `crop` samples
/// from the intersection end.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn road_inside_intersection(samples: &[Pose], crop: f64, direction: RoadDirection) -> Vec<Pose> {
    let last = (samples.len() - 1) as f64;
    match direction {
        RoadDirection::Outgoing => extract_range(samples, 0.0, crop.min(last)),
        RoadDirection::Incoming => extract_range(samples, (last - crop).max(0.0), last),
    }
}

/// Builds the surface grid of one corner.
///
/// The inside edge runs along the right road's centerline into the
/// intersection and out along the left road's centerline. The outside edge is
/// the corner outline. Rows in between are linear blends of the two.
#[derive(Debug)]
pub struct BuildContourGrid {
    corner: CornerId,
    num_samples: (usize, usize),
}

impl BuildContourGrid {
    /// `num_samples` is `(rows, samples per row)`; samples per row is odd so
    /// the middle sample sits at the intersection center.
    #[must_use]
    pub fn new(corner: CornerId, num_samples: (usize, usize)) -> Self {
        Self {
            corner,
            num_samples,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the corner or one of its roads is missing, or if
    /// a road or outline is too short to span the grid.
    pub fn execute(&self, store: &RoadNetworkStore) -> Result<ContourGrid> {
        let corner = store.corner(self.corner)?;
        let (rows, cols) = self.num_samples;

        let mut left = road_inside_intersection(
            store.road_samples(corner.left_road.road)?,
            corner.left_crop_index,
            corner.left_road.direction,
        );
        let mut right = road_inside_intersection(
            store.road_samples(corner.right_road.road)?,
            corner.right_crop_index,
            corner.right_road.direction,
        );
        if corner.left_road.direction == RoadDirection::Incoming {
            left = reverse_spline(&left);
        }
        if corner.right_road.direction == RoadDirection::Outgoing {
            right = reverse_spline(&right);
        }

        let half = cols / 2 + 1;
        let left = evenly_remap_spline(&left, half, false);
        let mut inside_edge = evenly_remap_spline(&right, half, false);
        inside_edge.extend_from_slice(left.get(1..).unwrap_or_default());
        let outside_edge = evenly_remap_spline(&corner.samples, cols, false);
        if inside_edge.len() != cols || outside_edge.len() != cols || rows < 2 {
            return Err(GeometryError::Degenerate(format!(
                "corner contour needs {cols} edge samples, got {} inside and {} outside",
                inside_edge.len(),
                outside_edge.len()
            ))
            .into());
        }

        let mut points = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            #[allow(clippy::cast_precision_loss)]
            let t = row as f64 / (rows - 1) as f64;
            for (inside, outside) in inside_edge.iter().zip(&outside_edge) {
                points.push(if row == 0 {
                    inside.position
                } else if row == rows - 1 {
                    outside.position
                } else {
                    inside.position + (outside.position - inside.position) * t
                });
            }
        }

        Ok(ContourGrid {
            size: (rows, cols),
            points,
            inside_edge,
            outside_edge,
        })
    }
}
