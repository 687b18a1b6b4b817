use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{parallel_seed, RoadBuilderParameters};
use crate::error::Result;
use crate::geometry::Pose;
use crate::math::Point3;
use crate::network::{
    ContourGrid, CornerId, IntersectionId, RoadConnection, RoadDirection, RoadId,
    RoadNetworkStore,
};
use crate::operations::contour::{
    crop_road, interpolate_contour, raise_intersection_contours, smooth_corner_outline,
    BuildContourGrid,
};
use crate::operations::corner::{
    corner_profile, BuildCornerEdges, RoundCorner, RoundedCornerGeometry,
    StitchIntersectionOutline,
};
use crate::operations::paths::{longest_path, EdgeOffset, TraverseRoadEdges};
use crate::operations::split::BuildRoadNetwork;
use crate::operations::topology::IdentifyCorners;
use crate::profile::{LateralProfileBuilder, RoadMaterial};
use crate::tessellation::{
    AssembleRoadMesh, LoftRoadMarking, LoftSurface, MeshPiece, RoadMesh, TessellateContour,
};

/// Everything produced from one set of splines.
#[derive(Debug, Default)]
pub struct RoadMeshOutput {
    /// Roads, intersections and corners after cropping.
    pub network: RoadNetworkStore,
    pub mesh: RoadMesh,
    /// One closed walk along the outer curb per connected block side.
    pub placement_paths: Vec<Vec<Pose>>,
    /// The longest walk just inside the drivable span.
    pub camera_path: Option<Vec<Pose>>,
}

/// Builds road meshes and paths from centerline splines.
///
/// Each stage computes its results for all roads, intersections or corners in
/// parallel against a read-only store, then writes them back on the calling
/// thread before the next stage starts.
#[derive(Debug)]
pub struct RoadBuilder {
    params: RoadBuilderParameters,
}

impl RoadBuilder {
    /// Parameters below their minimum are clamped.
    #[must_use]
    pub fn new(params: &RoadBuilderParameters) -> Self {
        Self {
            params: params.sanitized(),
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &RoadBuilderParameters {
        &self.params
    }

    /// Runs every stage on `splines`, given as point lists on the ground
    /// plane (y up).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CornerError`] if a corner cannot hold the
    /// configured radius, or an error from any stage that finds the network
    /// inconsistent.
    pub fn execute(&self, splines: &[Vec<Point3>]) -> Result<RoadMeshOutput> {
        let mut store = BuildRoadNetwork::new(splines).execute()?;
        debug!(
            roads = store.num_roads(),
            intersections = store.num_intersections(),
            "split splines into roads"
        );

        self.assign_profiles(&mut store)?;
        self.identify_corners(&mut store)?;
        self.round_corners(&mut store)?;
        let crops = self.stitch_outlines(&mut store)?;
        Self::assign_corner_profiles(&mut store)?;
        self.build_contours(&mut store)?;
        Self::crop_roads(&mut store, &crops)?;

        let mesh = AssembleRoadMesh::new(Self::mesh_pieces(&store)?).execute();
        info!(
            roads = store.num_roads(),
            intersections = store.num_intersections(),
            corners = store.num_corners(),
            vertices = mesh.mesh.vertex_count(),
            triangles = mesh.mesh.triangle_count(),
            "built road mesh"
        );

        let (placement_paths, camera_path) = self.paths(&store)?;
        Ok(RoadMeshOutput {
            network: store,
            mesh,
            placement_paths,
            camera_path,
        })
    }

    /// Gives every road a cross-section. With random lane counts, roads cut
    /// from the same street share one draw.
    fn assign_profiles(&self, store: &mut RoadNetworkStore) -> Result<()> {
        let profile_params = &self.params.profile;
        let seed = self.params.profile_seed();
        let lanes: Vec<(RoadId, usize)> = store
            .roads()
            .map(|(id, road)| {
                let n = if profile_params.random_num_lanes {
                    let mut rng = StdRng::seed_from_u64(parallel_seed(seed, road.street_id));
                    rng.gen_range(1..=profile_params.num_lanes)
                } else {
                    profile_params.num_lanes
                };
                (id, n)
            })
            .collect();

        let profiles: Vec<_> = lanes
            .par_iter()
            .map(|&(id, n)| {
                (
                    id,
                    LateralProfileBuilder::standard_road(profile_params, &self.params.markings, n),
                )
            })
            .collect();
        for (road, profile) in profiles {
            let profile = store.add_profile(profile);
            store.road_mut(road)?.profile = Some(profile);
        }
        debug!(roads = store.num_roads(), "assigned lateral profiles");
        Ok(())
    }

    /// Creates the corners of every intersection and their road edges.
    fn identify_corners(&self, store: &mut RoadNetworkStore) -> Result<()> {
        let radius = self.params.intersection.corner_radius;
        let ids: Vec<IntersectionId> = store
            .intersections()
            .filter(|(id, data)| {
                let keep = data.connections.len() >= 2;
                if !keep {
                    warn!(intersection = ?id, "intersection with a single road has no corners");
                }
                keep
            })
            .map(|(id, _)| id)
            .collect();

        let found = {
            let store = &*store;
            ids.par_iter()
                .map(|&id| IdentifyCorners::new(id, radius).execute(store))
                .collect::<Result<Vec<_>>>()?
        };
        for found in found {
            let corners: Vec<CornerId> = found
                .corners
                .into_iter()
                .map(|corner| store.add_corner(corner))
                .collect();
            let intersection = store.intersection_mut(found.intersection)?;
            intersection.connections = found.connections;
            intersection.corners = corners;
        }

        let corner_ids = store.corner_ids();
        let edges = {
            let store = &*store;
            corner_ids
                .par_iter()
                .map(|&id| BuildCornerEdges::new(id).execute(store))
                .collect::<Result<Vec<_>>>()?
        };
        for (id, edges) in corner_ids.into_iter().zip(edges) {
            let corner = store.corner_mut(id)?;
            corner.left_edge = edges.left;
            corner.right_edge = edges.right;
        }
        debug!(corners = store.num_corners(), "identified corners");
        Ok(())
    }

    fn round_corners(&self, store: &mut RoadNetworkStore) -> Result<()> {
        let spm = self.params.intersection.samples_per_meter;
        let corner_ids = store.corner_ids();
        let rounded = {
            let store = &*store;
            corner_ids
                .par_iter()
                .map(|&id| -> Result<RoundedCornerGeometry> {
                    let corner = store.corner(id)?;
                    RoundCorner::new(
                        id,
                        corner.intersection,
                        &corner.left_edge,
                        &corner.right_edge,
                        corner.radius,
                        spm,
                    )
                    .execute()
                })
                .collect::<Result<Vec<_>>>()?
        };
        for (id, geometry) in corner_ids.into_iter().zip(rounded) {
            let corner = store.corner_mut(id)?;
            corner.center = geometry.center;
            corner.left_tangent = geometry.left_tangent;
            corner.right_tangent = geometry.right_tangent;
            corner.tangent_left_index = geometry.tangent_left_index;
            corner.tangent_right_index = geometry.tangent_right_index;
            corner.arc = geometry.arc;
        }
        debug!(corners = store.num_corners(), "rounded corners");
        Ok(())
    }

    /// Stitches corner outlines and returns the crop index of every road end
    /// that meets an intersection.
    fn stitch_outlines(
        &self,
        store: &mut RoadNetworkStore,
    ) -> Result<HashMap<RoadConnection, f64>> {
        let spm = self.params.intersection.samples_per_meter;
        let ids = store.intersection_ids();
        let stitched = {
            let store = &*store;
            ids.par_iter()
                .map(|&id| StitchIntersectionOutline::new(id, spm).execute(store))
                .collect::<Result<Vec<_>>>()?
        };

        let mut crops = HashMap::new();
        for intersection in stitched {
            for (connection, crop) in intersection.road_crops {
                crops.entry(connection).or_insert(crop);
            }
            for outline in intersection.corners {
                let corner = store.corner_mut(outline.corner)?;
                corner.samples = outline.samples;
                corner.left_crop_index = outline.left_crop_index;
                corner.right_crop_index = outline.right_crop_index;
            }
        }
        debug!(road_ends = crops.len(), "stitched corner outlines");
        Ok(crops)
    }

    fn assign_corner_profiles(store: &mut RoadNetworkStore) -> Result<()> {
        let corner_ids = store.corner_ids();
        let profiles = {
            let store = &*store;
            corner_ids
                .par_iter()
                .map(|&id| corner_profile(store, id))
                .collect::<Result<Vec<_>>>()?
        };
        for (id, profile) in corner_ids.into_iter().zip(profiles) {
            let profile = store.add_profile(profile);
            store.corner_mut(id)?.profile = Some(profile);
        }
        Ok(())
    }

    /// Smooths corner outlines, then builds and blends the intersection
    /// surface grids.
    fn build_contours(&self, store: &mut RoadNetworkStore) -> Result<()> {
        let corner_ids = store.corner_ids();
        let smoothed: Vec<Vec<Pose>> = {
            let store = &*store;
            corner_ids
                .par_iter()
                .map(|&id| -> Result<Vec<Pose>> {
                    Ok(smooth_corner_outline(&store.corner(id)?.samples))
                })
                .collect::<Result<Vec<_>>>()?
        };
        for (&id, samples) in corner_ids.iter().zip(smoothed) {
            store.corner_mut(id)?.samples = samples;
        }

        let num_samples = self.params.intersection.num_samples;
        let grids = {
            let store = &*store;
            corner_ids
                .par_iter()
                .map(|&id| BuildContourGrid::new(id, num_samples).execute(store))
                .collect::<Result<Vec<_>>>()?
        };
        for (&id, grid) in corner_ids.iter().zip(grids) {
            store.corner_mut(id)?.contour = grid;
        }

        let ids = store.intersection_ids();
        let blended = {
            let store = &*store;
            ids.par_iter()
                .map(|&id| -> Result<Vec<(CornerId, ContourGrid)>> {
                    let corners = &store.intersection(id)?.corners;
                    let mut grids = corners
                        .iter()
                        .map(|&c| -> Result<ContourGrid> { Ok(store.corner(c)?.contour.clone()) })
                        .collect::<Result<Vec<_>>>()?;
                    raise_intersection_contours(&mut grids);
                    for grid in &mut grids {
                        interpolate_contour(grid);
                    }
                    Ok(corners.iter().copied().zip(grids).collect())
                })
                .collect::<Result<Vec<_>>>()?
        };
        for (id, grid) in blended.into_iter().flatten() {
            store.corner_mut(id)?.contour = grid;
        }
        debug!(corners = corner_ids.len(), "built intersection contours");
        Ok(())
    }

    fn crop_roads(
        store: &mut RoadNetworkStore,
        crops: &HashMap<RoadConnection, f64>,
    ) -> Result<()> {
        let road_ids = store.road_ids();
        let cropped = {
            let store = &*store;
            road_ids
                .par_iter()
                .map(|&id| -> Result<Vec<Pose>> {
                    let outgoing = crops
                        .get(&RoadConnection::new(id, RoadDirection::Outgoing))
                        .copied();
                    let incoming = crops
                        .get(&RoadConnection::new(id, RoadDirection::Incoming))
                        .copied();
                    Ok(crop_road(store.road_samples(id)?, outgoing, incoming))
                })
                .collect::<Result<Vec<_>>>()?
        };
        for (id, samples) in road_ids.into_iter().zip(cropped) {
            store.road_mut(id)?.samples = samples;
        }
        debug!(roads = store.num_roads(), "cropped roads");
        Ok(())
    }

    /// Lofts every road and corner profile and triangulates every
    /// intersection grid.
    fn mesh_pieces(store: &RoadNetworkStore) -> Result<Vec<MeshPiece>> {
        let road_pieces = store
            .road_ids()
            .par_iter()
            .map(|&id| -> Result<Vec<MeshPiece>> {
                let samples = store.road_samples(id)?;
                if samples.len() < 2 {
                    debug!(road = ?id, "road too short to loft");
                    return Ok(Vec::new());
                }
                let profile = store.road_profile(id)?;
                let mut pieces = Vec::new();
                for marking in 0..profile.markings.len() {
                    pieces.extend(LoftRoadMarking::new(samples, profile, marking).execute()?);
                }
                for surface in 0..profile.surfaces.len() {
                    pieces.push(LoftSurface::new(samples, profile, surface).execute()?);
                }
                Ok(pieces)
            })
            .collect::<Result<Vec<_>>>()?;

        let corner_pieces = store
            .corner_ids()
            .par_iter()
            .map(|&id| -> Result<Vec<MeshPiece>> {
                let corner = store.corner(id)?;
                let mut pieces = vec![MeshPiece::new(
                    RoadMaterial::RoadSurface,
                    TessellateContour::new(&corner.contour).execute()?,
                )];
                if corner.samples.len() >= 2 {
                    let profile = store.corner_profile(id)?;
                    for surface in 0..profile.surfaces.len() {
                        pieces.push(LoftSurface::new(&corner.samples, profile, surface).execute()?);
                    }
                }
                Ok(pieces)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(road_pieces
            .into_iter()
            .chain(corner_pieces)
            .flatten()
            .collect())
    }

    fn paths(&self, store: &RoadNetworkStore) -> Result<(Vec<Vec<Pose>>, Option<Vec<Pose>>)> {
        let paths = &self.params.paths;
        if !paths.generate_placement_paths && !paths.generate_camera_path {
            return Ok((Vec::new(), None));
        }
        if let Err(err) = self.params.validate_paths() {
            warn!(%err, "skipping path generation");
            return Ok((Vec::new(), None));
        }

        let placement = if paths.generate_placement_paths {
            TraverseRoadEdges::new(EdgeOffset::Curb, paths.max_traversal_steps).execute(store)?
        } else {
            Vec::new()
        };
        let camera = if paths.generate_camera_path {
            let offset = EdgeOffset::Lane {
                offset_from_curb: paths.offset_from_curb,
            };
            longest_path(TraverseRoadEdges::new(offset, paths.max_traversal_steps).execute(store)?)
        } else {
            None
        };
        debug!(
            placement_paths = placement.len(),
            camera_samples = camera.as_ref().map_or(0, Vec::len),
            "generated paths"
        );
        Ok((placement, camera))
    }
}
