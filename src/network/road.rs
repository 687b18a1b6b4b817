use crate::geometry::Pose;

use super::intersection::IntersectionId;
use super::profile::ProfileId;

slotmap::new_key_type! {
    /// Unique identifier for a road in the network store.
    pub struct RoadId;
}

/// Which way a road is traversed relative to an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoadDirection {
    /// The road's last sample touches the intersection.
    Incoming,
    /// The road's first sample touches the intersection.
    Outgoing,
}

impl RoadDirection {
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Incoming => Self::Outgoing,
            Self::Outgoing => Self::Incoming,
        }
    }
}

/// A road as seen from one of its end points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoadConnection {
    pub road: RoadId,
    pub direction: RoadDirection,
}

impl RoadConnection {
    #[must_use]
    pub fn new(road: RoadId, direction: RoadDirection) -> Self {
        Self { road, direction }
    }
}

/// Data associated with a road segment.
///
/// A road runs between at most two intersections. An open end (a dead end or
/// an untouched spline end) has no intersection.
#[derive(Debug, Clone)]
pub struct RoadData {
    /// Identifier shared by every road split from the same street.
    pub street_id: u32,
    /// Centerline samples in travel order.
    pub samples: Vec<Pose>,
    pub start_intersection: Option<IntersectionId>,
    pub end_intersection: Option<IntersectionId>,
    pub profile: Option<ProfileId>,
}

impl RoadData {
    /// Creates a road with no intersections and no profile.
    #[must_use]
    pub fn new(street_id: u32, samples: Vec<Pose>) -> Self {
        Self {
            street_id,
            samples,
            start_intersection: None,
            end_intersection: None,
            profile: None,
        }
    }

    /// The intersection the road touches when traversed in `direction`.
    ///
    /// An incoming road arrives at its end intersection, an outgoing road
    /// leaves its start intersection.
    #[must_use]
    pub fn intersection_at(&self, direction: RoadDirection) -> Option<IntersectionId> {
        match direction {
            RoadDirection::Incoming => self.end_intersection,
            RoadDirection::Outgoing => self.start_intersection,
        }
    }
}
