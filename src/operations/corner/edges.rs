use crate::error::Result;
use crate::geometry::spline::{offset_spline, reverse_spline};
use crate::geometry::Pose;
use crate::math::Vector3;
use crate::network::{CornerId, RoadDirection, RoadNetworkStore};

/// Drivable edges bounding one corner.
#[derive(Debug, Clone, Default)]
pub struct CornerEdges {
    /// Edge of the left road, running out of the intersection.
    pub left: Vec<Pose>,
    /// Edge of the right road, running into the intersection.
    pub right: Vec<Pose>,
}

/// Offsets the centerlines of a corner's two roads to the drivable edges
/// facing the corner.
#[derive(Debug)]
pub struct BuildCornerEdges {
    corner: CornerId,
}

impl BuildCornerEdges {
    #[must_use]
    pub fn new(corner: CornerId) -> Self {
        Self { corner }
    }

    /// Builds both edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner, its roads or their profiles are missing.
    pub fn execute(&self, store: &RoadNetworkStore) -> Result<CornerEdges> {
        let corner = store.corner(self.corner)?;

        let left_incoming = corner.left_road.direction == RoadDirection::Incoming;
        let left_profile = store.road_profile(corner.left_road.road)?;
        let left_x = if left_incoming {
            left_profile.left_drivable_offset.x
        } else {
            left_profile.right_drivable_offset.x
        };
        let mut left = offset_spline(
            store.road_samples(corner.left_road.road)?,
            &Vector3::new(left_x, 0.0, 0.0),
        );
        if left_incoming {
            left = reverse_spline(&left);
        }

        let right_outgoing = corner.right_road.direction == RoadDirection::Outgoing;
        let right_profile = store.road_profile(corner.right_road.road)?;
        let right_x = if right_outgoing {
            right_profile.left_drivable_offset.x
        } else {
            right_profile.right_drivable_offset.x
        };
        let mut right = offset_spline(
            store.road_samples(corner.right_road.road)?,
            &Vector3::new(right_x, 0.0, 0.0),
        );
        if right_outgoing {
            right = reverse_spline(&right);
        }

        Ok(CornerEdges { left, right })
    }
}
