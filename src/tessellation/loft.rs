use crate::error::{GeometryError, Result, TessellationError};
use crate::geometry::spline::offset_spline;
use crate::geometry::Pose;
use crate::math::{approx_eq, up, xz, Point2, Vector2, Vector3};
use crate::profile::{LateralProfile, ProfileSurface, RoadMarking, TextureCoordinateStrategy};

use super::marking::{dash_samples, DashedPath};
use super::{MeshPiece, TriangleMesh};

/// Sweeps one surface of a lateral profile along a path.
///
/// Surfaces next to a dashed lane line are triangulated against the dash
/// boundaries of that line so the gaps painted as road surface meet the
/// surface without T-junctions.
#[derive(Debug)]
pub struct LoftSurface<'a> {
    path: &'a [Pose],
    profile: &'a LateralProfile,
    surface: usize,
}

impl<'a> LoftSurface<'a> {
    #[must_use]
    pub fn new(path: &'a [Pose], profile: &'a LateralProfile, surface: usize) -> Self {
        Self {
            path,
            profile,
            surface,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the path has fewer than two samples, or if the
    /// surface index is out of range or the surface has fewer than two
    /// samples.
    pub fn execute(&self) -> Result<MeshPiece> {
        if self.path.len() < 2 {
            return Err(GeometryError::TooFewSamples {
                required: 2,
                actual: self.path.len(),
            }
            .into());
        }
        let surface = self.profile.surfaces.get(self.surface).ok_or_else(|| {
            TessellationError::InvalidInput(format!("no profile surface {}", self.surface))
        })?;
        if surface.sample_count < 2 {
            return Err(TessellationError::InvalidInput(format!(
                "profile surface {} has {} samples",
                self.surface, surface.sample_count
            ))
            .into());
        }

        let mesh = if self.has_dashed_marking(surface) {
            self.loft_between_dashes(surface)
        } else {
            self.loft(surface)
        };
        Ok(MeshPiece::new(surface.material, mesh))
    }

    fn marking_half_width(&self, marking: Option<usize>) -> f64 {
        marking
            .and_then(|m| self.profile.markings.get(m))
            .map_or(0.0, |m| m.width / 2.0)
    }

    fn dashed_marking(&self, marking: Option<usize>) -> Option<&RoadMarking> {
        marking
            .and_then(|m| self.profile.markings.get(m))
            .filter(|m| m.is_dashed())
    }

    fn has_dashed_marking(&self, surface: &ProfileSurface) -> bool {
        self.dashed_marking(surface.left_marking).is_some()
            || self.dashed_marking(surface.right_marking).is_some()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn loft(&self, surface: &ProfileSurface) -> TriangleMesh {
        let mut lateral: Vec<Point2> = self.profile.surface_samples(surface).to_vec();
        let last = lateral.len() - 1;
        lateral[0].x += self.marking_half_width(surface.left_marking);
        lateral[last].x -= self.marking_half_width(surface.right_marking);

        let lateral_normals = profile_normals(&lateral);
        let uvs = match surface.tex_strategy {
            TextureCoordinateStrategy::WorldSpace => None,
            TextureCoordinateStrategy::TrackSpace => Some(track_space_uvs(self.path, &lateral)),
        };

        let mut mesh = TriangleMesh::default();
        for (i, pose) in self.path.iter().enumerate() {
            for (j, (sample, normal)) in lateral.iter().zip(&lateral_normals).enumerate() {
                let position = pose.transform_point(&Vector3::new(sample.x, sample.y, 0.0));
                let uv = uvs
                    .as_ref()
                    .map_or_else(|| xz(&position), |uvs| uvs[i * lateral.len() + j]);
                mesh.push_vertex(position, pose.rotation * normal, uv);
            }
        }

        let width = lateral.len() as u32;
        for i in 1..self.path.len() as u32 {
            let prev = (i - 1) * width;
            let next = i * width;
            for k in 1..width {
                mesh.indices.push([prev + k, prev + k - 1, next + k - 1]);
                mesh.indices.push([next + k - 1, next + k, prev + k]);
            }
        }
        mesh
    }

    /// Flat loft of the surface's outer edges, each edge following the dash
    /// subdivision of the lane line on its side.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn loft_between_dashes(&self, surface: &ProfileSurface) -> TriangleMesh {
        let samples = self.profile.surface_samples(surface);
        let left_x = samples[0].x + self.marking_half_width(surface.left_marking);
        let right_x = samples[samples.len() - 1].x - self.marking_half_width(surface.right_marking);

        let edge = |marking: Option<usize>, x: f64| {
            let dashed = self
                .dashed_marking(marking)
                .map_or_else(|| DashedPath::undivided(self.path), |m| dash_samples(self.path, m));
            DashedPath {
                samples: offset_spline(&dashed.samples, &Vector3::new(x, 0.0, 0.0)),
                points: dashed.points,
            }
        };
        let left = edge(surface.left_marking, left_x);
        let right = edge(surface.right_marking, right_x);

        let mut mesh = TriangleMesh::default();
        for pose in left.samples.iter().chain(&right.samples) {
            mesh.push_vertex(pose.position, pose.rotation * up(), xz(&pose.position));
        }

        let num_left = left.samples.len() as u32;
        let (mut left_start, mut right_start) = (0, 0);
        for i in 1..self.path.len() {
            let next_left = next_sample_at(&left, left_start, i as f64);
            let next_right = next_sample_at(&right, right_start, i as f64);
            for j in left_start..next_left {
                mesh.indices
                    .push([right_start as u32 + num_left, j as u32, j as u32 + 1]);
            }
            for j in right_start..next_right {
                mesh.indices.push([
                    next_left as u32,
                    num_left + j as u32 + 1,
                    num_left + j as u32,
                ]);
            }
            left_start = next_left;
            right_start = next_right;
        }
        mesh
    }
}

/// First sample after `start` that sits on original path sample `index`.
fn next_sample_at(path: &DashedPath, start: usize, index: f64) -> usize {
    path.points
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, p)| approx_eq(p.index, index))
        .map_or(path.points.len() - 1, |(i, _)| i)
}

/// Per-sample normals of a cross-section, averaged across interior samples.
fn profile_normals(lateral: &[Point2]) -> Vec<Vector3> {
    let segment_normal = |a: &Point2, b: &Point2, fallback: Vector3| {
        (b - a)
            .try_normalize(f64::EPSILON)
            .map_or(fallback, |d: Vector2| Vector3::new(-d.y, d.x, 0.0))
    };

    let mut normals = Vec::with_capacity(lateral.len());
    let mut v1 = segment_normal(&lateral[0], &lateral[1], Vector3::y());
    normals.push(v1);
    let mut v2 = v1;
    for j in 1..lateral.len() - 1 {
        v2 = segment_normal(&lateral[j], &lateral[j + 1], v1);
        normals.push((v1 + v2).try_normalize(f64::EPSILON).unwrap_or(v2));
        v1 = v2;
    }
    normals.push(v2);
    normals
}

/// `u` is the distance across the profile, `v` the distance along the path.
fn track_space_uvs(path: &[Pose], lateral: &[Point2]) -> Vec<Point2> {
    let mut us = Vec::with_capacity(lateral.len());
    let mut u = 0.0;
    for (j, sample) in lateral.iter().enumerate() {
        if j > 0 {
            u += (sample - lateral[j - 1]).norm();
        }
        us.push(u);
    }

    let mut uvs = Vec::with_capacity(path.len() * lateral.len());
    let mut v = 0.0;
    for (i, pose) in path.iter().enumerate() {
        if i > 0 {
            v += (pose.position - path[i - 1].position).norm();
        }
        uvs.extend(us.iter().map(|&u| Point2::new(u, v)));
    }
    uvs
}
