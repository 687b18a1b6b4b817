use crate::math::Point2;

use super::corner::CornerId;
use super::road::RoadConnection;

slotmap::new_key_type! {
    /// Unique identifier for an intersection in the network store.
    pub struct IntersectionId;
}

/// A point where two or more road ends meet.
#[derive(Debug, Clone)]
pub struct IntersectionData {
    /// Ground-plane position of the crossing.
    pub position: Point2,
    /// Connected road ends, in insertion order.
    pub connections: Vec<RoadConnection>,
    /// Corners in counter-clockwise order once identified.
    pub corners: Vec<CornerId>,
}

impl IntersectionData {
    #[must_use]
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            connections: Vec::new(),
            corners: Vec::new(),
        }
    }
}
