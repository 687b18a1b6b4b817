use crate::geometry::Pose;
use crate::math::Point3;

use super::intersection::IntersectionId;
use super::profile::ProfileId;
use super::road::RoadConnection;

slotmap::new_key_type! {
    /// Unique identifier for a corner in the network store.
    pub struct CornerId;
}

/// Grid of intersection surface points between a corner's road edges and its
/// outline.
///
/// `points` is row-major with `size.0` rows of `size.1` points. Row zero runs
/// along the inside edge, the last row along the outline.
#[derive(Debug, Clone, Default)]
pub struct ContourGrid {
    pub size: (usize, usize),
    pub points: Vec<Point3>,
    pub inside_edge: Vec<Pose>,
    pub outside_edge: Vec<Pose>,
}

impl ContourGrid {
    /// Flat index of grid cell `(x, y)`.
    #[must_use]
    pub fn index(&self, x: usize, y: usize) -> usize {
        x * self.size.1 + y
    }

    #[must_use]
    pub fn point(&self, x: usize, y: usize) -> &Point3 {
        &self.points[self.index(x, y)]
    }

    pub fn point_mut(&mut self, x: usize, y: usize) -> &mut Point3 {
        let idx = self.index(x, y);
        &mut self.points[idx]
    }
}

/// Data associated with the corner between two adjacent roads of an
/// intersection.
///
/// Looking out of the intersection, the right road sits clockwise of the left
/// road.
#[derive(Debug, Clone)]
pub struct CornerData {
    pub intersection: IntersectionId,
    pub left_road: RoadConnection,
    pub right_road: RoadConnection,
    pub radius: f64,

    /// Center of the rounding arc.
    pub center: Point3,
    pub left_tangent: Pose,
    pub right_tangent: Pose,
    /// Fractional sample index of the left tangent on the left edge.
    pub tangent_left_index: f64,
    /// Fractional sample index of the right tangent, counted from the
    /// intersection end of the right edge.
    pub tangent_right_index: f64,

    /// Drivable edge of the left road, running out of the intersection.
    pub left_edge: Vec<Pose>,
    /// Drivable edge of the right road, running into the intersection.
    pub right_edge: Vec<Pose>,
    /// Arc samples from the right tangent to the left tangent.
    pub arc: Vec<Pose>,

    /// Crop index applied to the left road, counted from the intersection.
    pub left_crop_index: f64,
    /// Crop index applied to the right road, counted from the intersection.
    pub right_crop_index: f64,

    /// Corner outline running from the right road edge to the left road edge.
    pub samples: Vec<Pose>,
    pub contour: ContourGrid,
    pub profile: Option<ProfileId>,
}

impl CornerData {
    /// Creates an unsolved corner.
    #[must_use]
    pub fn new(
        intersection: IntersectionId,
        left_road: RoadConnection,
        right_road: RoadConnection,
        radius: f64,
    ) -> Self {
        Self {
            intersection,
            left_road,
            right_road,
            radius,
            center: Point3::origin(),
            left_tangent: Pose::default(),
            right_tangent: Pose::default(),
            tangent_left_index: 0.0,
            tangent_right_index: 0.0,
            left_edge: Vec::new(),
            right_edge: Vec::new(),
            arc: Vec::new(),
            left_crop_index: 0.0,
            right_crop_index: 0.0,
            samples: Vec::new(),
            contour: ContourGrid::default(),
            profile: None,
        }
    }
}
