pub mod corner;
pub mod intersection;
pub mod profile;
pub mod road;

pub use corner::{ContourGrid, CornerData, CornerId};
pub use intersection::{IntersectionData, IntersectionId};
pub use profile::ProfileId;
pub use road::{RoadConnection, RoadData, RoadDirection, RoadId};

use crate::error::NetworkError;
use crate::geometry::Pose;
use crate::profile::LateralProfile;
use slotmap::SlotMap;

/// Central arena that owns the road network.
///
/// Roads, intersections and corners reference each other via typed IDs
/// (generational indices), so stages can rewrite one entity while reading
/// others by handle.
#[derive(Debug, Default)]
pub struct RoadNetworkStore {
    roads: SlotMap<RoadId, RoadData>,
    intersections: SlotMap<IntersectionId, IntersectionData>,
    corners: SlotMap<CornerId, CornerData>,
    profiles: SlotMap<ProfileId, LateralProfile>,
}

impl RoadNetworkStore {
    /// Creates a new, empty network store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Road operations ---

    /// Inserts a road and returns its ID.
    pub fn add_road(&mut self, data: RoadData) -> RoadId {
        self.roads.insert(data)
    }

    /// Returns a reference to the road data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the road is not in the store.
    pub fn road(&self, id: RoadId) -> Result<&RoadData, NetworkError> {
        self.roads.get(id).ok_or(NetworkError::RoadNotFound)
    }

    /// Returns a mutable reference to the road data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the road is not in the store.
    pub fn road_mut(&mut self, id: RoadId) -> Result<&mut RoadData, NetworkError> {
        self.roads.get_mut(id).ok_or(NetworkError::RoadNotFound)
    }

    /// Iterates over all roads in insertion order.
    pub fn roads(&self) -> impl Iterator<Item = (RoadId, &RoadData)> {
        self.roads.iter()
    }

    #[must_use]
    pub fn road_ids(&self) -> Vec<RoadId> {
        self.roads.keys().collect()
    }

    #[must_use]
    pub fn num_roads(&self) -> usize {
        self.roads.len()
    }

    // --- Intersection operations ---

    /// Inserts an intersection and returns its ID.
    pub fn add_intersection(&mut self, data: IntersectionData) -> IntersectionId {
        self.intersections.insert(data)
    }

    /// Returns a reference to the intersection data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the intersection is not in the store.
    pub fn intersection(&self, id: IntersectionId) -> Result<&IntersectionData, NetworkError> {
        self.intersections
            .get(id)
            .ok_or(NetworkError::IntersectionNotFound)
    }

    /// Returns a mutable reference to the intersection data, or an error if
    /// not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the intersection is not in the store.
    pub fn intersection_mut(
        &mut self,
        id: IntersectionId,
    ) -> Result<&mut IntersectionData, NetworkError> {
        self.intersections
            .get_mut(id)
            .ok_or(NetworkError::IntersectionNotFound)
    }

    /// Iterates over all intersections in insertion order.
    pub fn intersections(&self) -> impl Iterator<Item = (IntersectionId, &IntersectionData)> {
        self.intersections.iter()
    }

    #[must_use]
    pub fn intersection_ids(&self) -> Vec<IntersectionId> {
        self.intersections.keys().collect()
    }

    #[must_use]
    pub fn num_intersections(&self) -> usize {
        self.intersections.len()
    }

    // --- Corner operations ---

    /// Inserts a corner and returns its ID.
    pub fn add_corner(&mut self, data: CornerData) -> CornerId {
        self.corners.insert(data)
    }

    /// Returns a reference to the corner data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not in the store.
    pub fn corner(&self, id: CornerId) -> Result<&CornerData, NetworkError> {
        self.corners.get(id).ok_or(NetworkError::CornerNotFound)
    }

    /// Returns a mutable reference to the corner data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not in the store.
    pub fn corner_mut(&mut self, id: CornerId) -> Result<&mut CornerData, NetworkError> {
        self.corners.get_mut(id).ok_or(NetworkError::CornerNotFound)
    }

    /// Iterates over all corners in insertion order.
    pub fn corners(&self) -> impl Iterator<Item = (CornerId, &CornerData)> {
        self.corners.iter()
    }

    #[must_use]
    pub fn corner_ids(&self) -> Vec<CornerId> {
        self.corners.keys().collect()
    }

    #[must_use]
    pub fn num_corners(&self) -> usize {
        self.corners.len()
    }

    // --- Profile operations ---

    /// Inserts a lateral profile and returns its ID.
    pub fn add_profile(&mut self, profile: LateralProfile) -> ProfileId {
        self.profiles.insert(profile)
    }

    /// Returns a reference to the profile, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is not in the store.
    pub fn profile(&self, id: ProfileId) -> Result<&LateralProfile, NetworkError> {
        self.profiles.get(id).ok_or(NetworkError::ProfileNotFound)
    }

    // --- Derived queries ---

    /// Centerline samples of road `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the road is not in the store.
    pub fn road_samples(&self, id: RoadId) -> Result<&[Pose], NetworkError> {
        Ok(&self.road(id)?.samples)
    }

    /// Profile assigned to `road`.
    ///
    /// # Errors
    ///
    /// Returns an error if the road has no profile or either handle is stale.
    pub fn road_profile(&self, road: RoadId) -> Result<&LateralProfile, NetworkError> {
        let id = self
            .road(road)?
            .profile
            .ok_or(NetworkError::ProfileNotFound)?;
        self.profile(id)
    }

    /// Profile assigned to `corner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner has no profile or either handle is stale.
    pub fn corner_profile(&self, corner: CornerId) -> Result<&LateralProfile, NetworkError> {
        let id = self
            .corner(corner)?
            .profile
            .ok_or(NetworkError::ProfileNotFound)?;
        self.profile(id)
    }

    /// Finds the corner of `intersection` whose right road is `connection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the intersection handle is stale.
    pub fn corner_with_right_road(
        &self,
        intersection: IntersectionId,
        connection: RoadConnection,
    ) -> Result<Option<CornerId>, NetworkError> {
        for &id in &self.intersection(intersection)?.corners {
            if self.corner(id)?.right_road == connection {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Point3};

    fn straight_road(street_id: u32) -> RoadData {
        RoadData::new(
            street_id,
            vec![
                Pose::from_position(Point3::new(0.0, 0.0, 0.0)),
                Pose::from_position(Point3::new(0.0, 0.0, 10.0)),
            ],
        )
    }

    #[test]
    fn add_and_fetch_entities() {
        let mut store = RoadNetworkStore::new();
        let road = store.add_road(straight_road(3));
        let inter = store.add_intersection(IntersectionData::new(Point2::new(0.0, 10.0)));
        store.road_mut(road).unwrap().end_intersection = Some(inter);

        assert_eq!(store.road(road).unwrap().street_id, 3);
        assert_eq!(
            store.road(road).unwrap().intersection_at(RoadDirection::Incoming),
            Some(inter)
        );
        assert_eq!(
            store.road(road).unwrap().intersection_at(RoadDirection::Outgoing),
            None
        );
        assert_eq!(store.num_roads(), 1);
        assert_eq!(store.num_intersections(), 1);
    }

    #[test]
    fn stale_handles_are_errors() {
        let mut store = RoadNetworkStore::new();
        let other = {
            let mut scratch = RoadNetworkStore::new();
            scratch.add_road(straight_road(0));
            scratch.add_road(straight_road(1))
        };
        store.add_road(straight_road(0));
        assert!(matches!(store.road(other), Err(NetworkError::RoadNotFound)));
        assert!(matches!(
            store.road_profile(store.road_ids()[0]),
            Err(NetworkError::ProfileNotFound)
        ));
    }

    #[test]
    fn corner_lookup_by_right_road() {
        let mut store = RoadNetworkStore::new();
        let a = store.add_road(straight_road(0));
        let b = store.add_road(straight_road(1));
        let inter = store.add_intersection(IntersectionData::new(Point2::origin()));
        let left = RoadConnection::new(a, RoadDirection::Outgoing);
        let right = RoadConnection::new(b, RoadDirection::Incoming);
        let corner = store.add_corner(CornerData::new(inter, left, right, 2.0));
        store.intersection_mut(inter).unwrap().corners.push(corner);

        assert_eq!(
            store.corner_with_right_road(inter, right).unwrap(),
            Some(corner)
        );
        assert_eq!(store.corner_with_right_road(inter, left).unwrap(), None);
    }

    #[test]
    fn direction_inverse() {
        assert_eq!(RoadDirection::Incoming.inverse(), RoadDirection::Outgoing);
        assert_eq!(RoadDirection::Outgoing.inverse(), RoadDirection::Incoming);
    }
}
