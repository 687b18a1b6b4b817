use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::spline::{extract_range, positions_to_poses, remove_overlapping_points};
use crate::geometry::Pose;
use crate::math::distance_2d::unlerp;
use crate::math::intersect_2d::segment_intersection_2d;
use crate::math::{approx_eq, approx_eq_2d, Point2, Point3, TOLERANCE};
use crate::network::{
    IntersectionData, IntersectionId, RoadConnection, RoadData, RoadDirection, RoadNetworkStore,
};

/// Points of an input spline closer than this are merged.
pub const MIN_SAMPLE_DISTANCE: f64 = 0.1;

/// A crossing found on one spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPoint {
    /// Fractional sample index on the spline.
    pub index: f64,
    pub point: Point2,
    /// The spline crosses itself here.
    pub self_intersection: bool,
}

/// Finds where a spline crosses itself.
///
/// Adjacent segments are never tested against each other.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn find_self_intersections(spline: &[Pose]) -> Vec<SplitPoint> {
    let mut found = Vec::new();
    for j in 1..spline.len() {
        let a0 = spline[j - 1].xz();
        let a1 = spline[j].xz();
        for k in (j + 2)..spline.len() {
            let b0 = spline[k - 1].xz();
            let b1 = spline[k].xz();
            if let Some(point) = segment_intersection_2d(&a1, &a0, &b1, &b0) {
                for index in [
                    (j - 1) as f64 + unlerp(&a0, &a1, &point),
                    (k - 1) as f64 + unlerp(&b0, &b1, &point),
                ] {
                    found.push(SplitPoint {
                        index,
                        point,
                        self_intersection: true,
                    });
                }
            }
        }
    }
    found
}

/// Finds every crossing between two distinct splines, returning the split
/// points on `a` and on `b`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn find_cross_intersections(a: &[Pose], b: &[Pose]) -> (Vec<SplitPoint>, Vec<SplitPoint>) {
    let mut on_a = Vec::new();
    let mut on_b = Vec::new();
    for p in 1..a.len() {
        let a0 = a[p - 1].xz();
        let a1 = a[p].xz();
        for q in 1..b.len() {
            let b0 = b[q - 1].xz();
            let b1 = b[q].xz();
            if let Some(point) = segment_intersection_2d(&a0, &a1, &b0, &b1) {
                on_a.push(SplitPoint {
                    index: (p - 1) as f64 + unlerp(&a0, &a1, &point),
                    point,
                    self_intersection: false,
                });
                on_b.push(SplitPoint {
                    index: (q - 1) as f64 + unlerp(&b0, &b1, &point),
                    point,
                    self_intersection: false,
                });
            }
        }
    }
    (on_a, on_b)
}

/// Sorts split points along the spline and merges those at the same index.
///
/// A merged point is a self intersection if any of its sources was.
#[must_use]
pub fn merge_split_points(mut points: Vec<SplitPoint>) -> Vec<SplitPoint> {
    points.sort_by(|a, b| a.index.total_cmp(&b.index));
    let mut merged: Vec<SplitPoint> = Vec::with_capacity(points.len());
    for point in points {
        match merged.last_mut() {
            Some(last) if approx_eq(last.index, point.index) => {
                last.self_intersection |= point.self_intersection;
            }
            _ => merged.push(point),
        }
    }
    merged
}

/// Builds the road network from sampled input splines.
///
/// Splines that cross nothing become one road each. Crossing splines are cut
/// at every crossing. Consecutive roads of one spline share a street id
/// unless the cut between them is a self intersection.
#[derive(Debug)]
pub struct BuildRoadNetwork<'a> {
    splines: &'a [Vec<Point3>],
}

impl<'a> BuildRoadNetwork<'a> {
    #[must_use]
    pub fn new(splines: &'a [Vec<Point3>]) -> Self {
        Self { splines }
    }

    /// Splits the splines and returns the populated store.
    ///
    /// # Errors
    ///
    /// Returns an error if a freshly created entity cannot be found, which
    /// indicates a bug in the construction.
    pub fn execute(&self) -> Result<RoadNetworkStore> {
        let splines: Vec<Vec<Pose>> = self
            .splines
            .iter()
            .enumerate()
            .filter_map(|(i, positions)| {
                let points = remove_overlapping_points(positions, MIN_SAMPLE_DISTANCE);
                if points.len() < 2 {
                    warn!(spline = i, samples = points.len(), "dropping degenerate spline");
                    return None;
                }
                Some(positions_to_poses(&points, false))
            })
            .collect();

        let split_points = find_split_points(&splines);

        let mut store = RoadNetworkStore::new();
        let mut unique: Vec<(Point2, IntersectionId)> = Vec::new();
        let mut intersection_for = |store: &mut RoadNetworkStore, point: Point2| {
            if let Some((_, id)) = unique.iter().find(|(p, _)| approx_eq_2d(p, &point)) {
                return *id;
            }
            let id = store.add_intersection(IntersectionData::new(point));
            unique.push((point, id));
            id
        };

        let non_intersecting: Vec<usize> = (0..splines.len())
            .filter(|&i| split_points[i].is_empty())
            .collect();

        #[allow(clippy::cast_possible_truncation)]
        let mut street_id = non_intersecting.len() as u32;
        for (spline, points) in splines.iter().zip(&split_points) {
            if points.is_empty() {
                continue;
            }
            let ids: Vec<IntersectionId> = points
                .iter()
                .map(|p| intersection_for(&mut store, p.point))
                .collect();

            #[allow(clippy::cast_precision_loss)]
            let last_index = (spline.len() - 1) as f64;
            add_road(&mut store, spline, street_id, 0.0, points[0].index, None, Some(ids[0]))?;
            for k in 1..points.len() {
                if points[k - 1].self_intersection {
                    street_id += 1;
                }
                add_road(
                    &mut store,
                    spline,
                    street_id,
                    points[k - 1].index,
                    points[k].index,
                    Some(ids[k - 1]),
                    Some(ids[k]),
                )?;
            }
            let last = points.len() - 1;
            if points[last].self_intersection {
                street_id += 1;
            }
            add_road(
                &mut store,
                spline,
                street_id,
                points[last].index,
                last_index,
                Some(ids[last]),
                None,
            )?;
            street_id += 1;
        }

        for (street, &i) in non_intersecting.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            store.add_road(RoadData::new(street as u32, splines[i].clone()));
        }

        debug!(
            splines = splines.len(),
            roads = store.num_roads(),
            intersections = store.num_intersections(),
            "split splines into roads"
        );
        Ok(store)
    }
}

/// Merged split points of every spline, in spline order.
fn find_split_points(splines: &[Vec<Pose>]) -> Vec<Vec<SplitPoint>> {
    let mut points: Vec<Vec<SplitPoint>> =
        splines.par_iter().map(|s| find_self_intersections(s)).collect();

    let pairs: Vec<(usize, usize)> = (0..splines.len())
        .flat_map(|a| ((a + 1)..splines.len()).map(move |b| (a, b)))
        .collect();
    let crossings: Vec<(usize, usize, Vec<SplitPoint>, Vec<SplitPoint>)> = pairs
        .par_iter()
        .map(|&(a, b)| {
            let (on_a, on_b) = find_cross_intersections(&splines[a], &splines[b]);
            (a, b, on_a, on_b)
        })
        .collect();
    for (a, b, on_a, on_b) in crossings {
        points[a].extend(on_a);
        points[b].extend(on_b);
    }

    points.into_iter().map(merge_split_points).collect()
}

/// Adds the road covering `start..end` of `spline` and registers it with the
/// intersections at its ends.
fn add_road(
    store: &mut RoadNetworkStore,
    spline: &[Pose],
    street_id: u32,
    start: f64,
    end: f64,
    start_intersection: Option<IntersectionId>,
    end_intersection: Option<IntersectionId>,
) -> Result<()> {
    if end - start < TOLERANCE {
        debug!(street_id, start, "skipping zero-length road");
        return Ok(());
    }
    let mut road = RoadData::new(street_id, extract_range(spline, start, end));
    road.start_intersection = start_intersection;
    road.end_intersection = end_intersection;
    let id = store.add_road(road);

    if let Some(inter) = start_intersection {
        store
            .intersection_mut(inter)?
            .connections
            .push(RoadConnection::new(id, RoadDirection::Outgoing));
    }
    if let Some(inter) = end_intersection {
        store
            .intersection_mut(inter)?
            .connections
            .push(RoadConnection::new(id, RoadDirection::Incoming));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Straight line from `a` to `b` with `n` segments.
    fn subdivided(a: (f64, f64), b: (f64, f64), n: usize) -> Vec<Point3> {
        (0..=n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f64 / n as f64;
                Point3::new(a.0 + (b.0 - a.0) * t, 0.0, a.1 + (b.1 - a.1) * t)
            })
            .collect()
    }

    fn poses(points: &[(f64, f64)]) -> Vec<Pose> {
        let p: Vec<Point3> = points.iter().map(|&(x, z)| Point3::new(x, 0.0, z)).collect();
        positions_to_poses(&p, false)
    }

    #[test]
    fn self_intersection_indices() {
        // Bow tie: segment 0 crosses segment 2 at the origin.
        let spline = poses(&[(-1.0, -1.0), (1.0, 1.0), (1.0, -1.0), (-1.0, 1.0)]);
        let found = find_self_intersections(&spline);
        assert_eq!(found.len(), 2);
        assert!((found[0].index - 0.5).abs() < 1e-9);
        assert!((found[1].index - 2.5).abs() < 1e-9);
        assert!(found.iter().all(|p| p.self_intersection));
        assert!(approx_eq_2d(&found[0].point, &Point2::origin()));
    }

    #[test]
    fn adjacent_segments_are_not_self_intersections() {
        let spline = poses(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0)]);
        assert!(find_self_intersections(&spline).is_empty());
    }

    #[test]
    fn cross_intersection_indices() {
        let a = poses(&[(-2.0, 0.0), (0.0, 0.0), (2.0, 0.0)]);
        let b = poses(&[(1.0, -1.0), (1.0, 1.0)]);
        let (on_a, on_b) = find_cross_intersections(&a, &b);
        assert_eq!(on_a.len(), 1);
        assert!((on_a[0].index - 1.5).abs() < 1e-9);
        assert!((on_b[0].index - 0.5).abs() < 1e-9);
        assert!(!on_a[0].self_intersection);
    }

    #[test]
    fn merge_keeps_self_flag() {
        let p = Point2::origin();
        let merged = merge_split_points(vec![
            SplitPoint {
                index: 3.0,
                point: p,
                self_intersection: false,
            },
            SplitPoint {
                index: 1.0,
                point: p,
                self_intersection: false,
            },
            SplitPoint {
                index: 3.000_001,
                point: p,
                self_intersection: true,
            },
        ]);
        assert_eq!(merged.len(), 2);
        assert!((merged[0].index - 1.0).abs() < 1e-9);
        assert!(merged[1].self_intersection);
    }

    #[test]
    fn crossing_splines_make_four_roads() {
        let splines = vec![
            subdivided((-30.0, 0.0), (30.0, 0.0), 15),
            subdivided((0.0, -30.0), (0.0, 30.0), 15),
        ];
        let store = BuildRoadNetwork::new(&splines).execute().unwrap();
        assert_eq!(store.num_roads(), 4);
        assert_eq!(store.num_intersections(), 1);
        let (_, inter) = store.intersections().next().unwrap();
        assert_eq!(inter.connections.len(), 4);
        assert!(approx_eq_2d(&inter.position, &Point2::origin()));

        let streets: Vec<u32> = store.roads().map(|(_, r)| r.street_id).collect();
        assert_eq!(streets, vec![0, 0, 1, 1]);
    }

    #[test]
    fn split_preserves_positions() {
        let splines = vec![
            subdivided((-30.0, 0.0), (30.0, 0.0), 15),
            subdivided((0.0, -30.0), (0.0, 30.0), 15),
        ];
        let store = BuildRoadNetwork::new(&splines).execute().unwrap();
        let roads: Vec<&RoadData> = store.roads().map(|(_, r)| r).collect();
        let mut joined: Vec<Point3> = roads[0].samples.iter().map(|p| p.position).collect();
        joined.extend(roads[1].samples.iter().skip(1).map(|p| p.position));
        let mut expected = splines[0].clone();
        expected.insert(8, Point3::origin());
        assert_eq!(joined.len(), expected.len());
        for (a, b) in joined.iter().zip(&expected) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn self_crossing_bumps_street_id() {
        let mut figure_eight = subdivided((-40.0, -40.0), (40.0, 40.0), 15);
        figure_eight.extend(subdivided((40.0, 40.0), (40.0, -40.0), 15).into_iter().skip(1));
        figure_eight.extend(subdivided((40.0, -40.0), (-40.0, 40.0), 15).into_iter().skip(1));
        let store = BuildRoadNetwork::new(&[figure_eight]).execute().unwrap();

        assert_eq!(store.num_roads(), 3);
        assert_eq!(store.num_intersections(), 1);
        let streets: Vec<u32> = store.roads().map(|(_, r)| r.street_id).collect();
        assert_eq!(streets, vec![0, 1, 2]);

        let roads: Vec<&RoadData> = store.roads().map(|(_, r)| r).collect();
        assert!(roads[0].start_intersection.is_none());
        assert_eq!(roads[1].start_intersection, roads[1].end_intersection);
        assert!(roads[2].end_intersection.is_none());
    }

    #[test]
    fn lone_splines_keep_their_order_as_street_ids() {
        let splines = vec![
            subdivided((0.0, 0.0), (10.0, 0.0), 4),
            subdivided((0.0, 5.0), (10.0, 5.0), 4),
            vec![Point3::origin(), Point3::new(0.0, 0.0, 0.05)],
        ];
        let store = BuildRoadNetwork::new(&splines).execute().unwrap();
        assert_eq!(store.num_roads(), 2);
        assert_eq!(store.num_intersections(), 0);
        let streets: Vec<u32> = store.roads().map(|(_, r)| r.street_id).collect();
        assert_eq!(streets, vec![0, 1]);
    }
}
