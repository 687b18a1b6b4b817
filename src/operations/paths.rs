use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::spline::{offset_spline, reverse_spline, spline_length};
use crate::geometry::Pose;
use crate::math::Vector3;
use crate::network::{CornerId, RoadConnection, RoadDirection, RoadNetworkStore};

/// Where along the cross-section a walk runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeOffset {
    /// The outermost profile sample of roads and corners.
    Curb,
    /// Inside the drivable span, this far from its edge.
    Lane { offset_from_curb: f64 },
}

/// Walks every road side once and returns one path per walk.
///
/// A walk follows one side of a road, turns right through the corner at the
/// intersection it reaches and continues on the next road, until it arrives
/// back at a road side it has already covered. Dead ends turn the walk
/// around onto the other side of the same road.
///
/// Road sides are visited starting from each road in store order, first
/// along the road and then against it.
#[derive(Debug)]
pub struct TraverseRoadEdges {
    offset: EdgeOffset,
    max_steps: usize,
}

impl TraverseRoadEdges {
    #[must_use]
    pub fn new(offset: EdgeOffset, max_steps: usize) -> Self {
        Self { offset, max_steps }
    }

    /// # Errors
    ///
    /// Returns an error if a road, corner or profile referenced by the
    /// network is missing.
    pub fn execute(&self, store: &RoadNetworkStore) -> Result<Vec<Vec<Pose>>> {
        let mut visited: HashSet<RoadConnection> = HashSet::new();
        let mut paths = Vec::new();
        for road in store.road_ids() {
            for direction in [RoadDirection::Outgoing, RoadDirection::Incoming] {
                let start = RoadConnection::new(road, direction);
                if visited.contains(&start) {
                    continue;
                }
                paths.push(self.walk(store, start, &mut visited)?);
            }
        }
        debug!(paths = paths.len(), "traversed road edges");
        Ok(paths)
    }

    /// Follows road sides from `start` until reaching a visited one.
    ///
    /// Here `direction` is the walking direction: `Outgoing` walks from the
    /// road's start to its end.
    fn walk(
        &self,
        store: &RoadNetworkStore,
        start: RoadConnection,
        visited: &mut HashSet<RoadConnection>,
    ) -> Result<Vec<Pose>> {
        let mut path = Vec::new();
        let mut current = start;
        let mut steps = 0;
        while !visited.contains(&current) {
            if steps == self.max_steps {
                warn!(
                    steps,
                    samples = path.len(),
                    "road edge traversal hit its step limit, path may be incomplete"
                );
                break;
            }
            visited.insert(current);
            steps += 1;

            path.extend(self.road_side(store, current)?);

            let road = store.road(current.road)?;
            let reached = road.intersection_at(current.direction.inverse());
            let Some(intersection) = reached else {
                current.direction = current.direction.inverse();
                continue;
            };
            let arrival = RoadConnection::new(current.road, current.direction.inverse());
            let Some(corner) = store.corner_with_right_road(intersection, arrival)? else {
                warn!(?intersection, "no corner continues the road edge walk");
                break;
            };
            path.extend(self.corner_side(store, corner)?);
            current = store.corner(corner)?.left_road;
        }
        Ok(path)
    }

    fn road_side(&self, store: &RoadNetworkStore, side: RoadConnection) -> Result<Vec<Pose>> {
        let samples = store.road_samples(side.road)?;
        let profile = store.road_profile(side.road)?;
        let against = side.direction == RoadDirection::Incoming;
        let x = match self.offset {
            EdgeOffset::Curb => {
                let sample = if against {
                    profile.samples.first()
                } else {
                    profile.samples.last()
                };
                sample.map_or(0.0, |s| s.x)
            }
            EdgeOffset::Lane { offset_from_curb } => {
                if against {
                    profile.left_drivable_offset.x + offset_from_curb
                } else {
                    profile.right_drivable_offset.x - offset_from_curb
                }
            }
        };
        let offset = offset_spline(samples, &Vector3::new(x, 0.0, 0.0));
        Ok(if against {
            reverse_spline(&offset)
        } else {
            offset
        })
    }

    fn corner_side(&self, store: &RoadNetworkStore, corner: CornerId) -> Result<Vec<Pose>> {
        let samples = &store.corner(corner)?.samples;
        let x = match self.offset {
            EdgeOffset::Curb => store
                .corner_profile(corner)?
                .samples
                .last()
                .map_or(0.0, |s| s.x),
            EdgeOffset::Lane { offset_from_curb } => -offset_from_curb,
        };
        Ok(offset_spline(samples, &Vector3::new(x, 0.0, 0.0)))
    }
}

/// The longest of `paths` by 3D length.
#[must_use]
pub fn longest_path(paths: Vec<Vec<Pose>>) -> Option<Vec<Pose>> {
    paths
        .into_iter()
        .map(|p| (spline_length(&p), p))
        .filter(|(len, _)| *len > 0.0)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, p)| p)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{LateralProfileParameters, RoadMarkingParameters};
    use crate::geometry::spline::positions_to_poses;
    use crate::math::Point3;
    use crate::network::RoadData;
    use crate::profile::LateralProfileBuilder;

    fn dead_end_store() -> RoadNetworkStore {
        let mut store = RoadNetworkStore::new();
        let profile = store.add_profile(LateralProfileBuilder::standard_road(
            &LateralProfileParameters::default(),
            &RoadMarkingParameters::default(),
            2,
        ));
        let points: Vec<Point3> = (0..=10)
            .map(|i| Point3::new(0.0, 0.0, f64::from(i) * 3.0))
            .collect();
        let mut road = RoadData::new(0, positions_to_poses(&points, false));
        road.profile = Some(profile);
        store.add_road(road);
        store
    }

    #[test]
    fn dead_end_road_is_one_loop() {
        let store = dead_end_store();
        let paths = TraverseRoadEdges::new(EdgeOffset::Curb, 1000)
            .execute(&store)
            .unwrap();
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert_eq!(path.len(), 22);
        // Out along the right curb, back along the left curb.
        assert!(path[0].position.x > 0.0);
        assert!(path[21].position.x < 0.0);
        assert!((path[10].position.z - 30.0).abs() < 1e-9);
        assert!((path[21].position.z).abs() < 1e-9);
    }

    #[test]
    fn lane_offset_sits_inside_the_drivable_span() {
        let store = dead_end_store();
        let profile = store.profile(store.roads().next().unwrap().1.profile.unwrap()).unwrap();
        let edge = profile.right_drivable_offset.x;
        let paths = TraverseRoadEdges::new(
            EdgeOffset::Lane {
                offset_from_curb: 1.5,
            },
            1000,
        )
        .execute(&store)
        .unwrap();
        assert!((paths[0][0].position.x - (edge - 1.5)).abs() < 1e-9);
    }

    #[test]
    fn step_limit_truncates_walk() {
        let store = dead_end_store();
        let paths = TraverseRoadEdges::new(EdgeOffset::Curb, 1)
            .execute(&store)
            .unwrap();
        // The first walk stops after one side, the other side starts its own.
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].len(), 11);
    }

    #[test]
    fn longest_path_wins() {
        let short = positions_to_poses(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)], false);
        let long = positions_to_poses(&[Point3::origin(), Point3::new(5.0, 0.0, 0.0)], false);
        let best = longest_path(vec![short, long.clone(), Vec::new()]).unwrap();
        assert_eq!(best, long);
        assert!(longest_path(Vec::new()).is_none());
    }
}
