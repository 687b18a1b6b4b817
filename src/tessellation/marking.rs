use crate::error::{GeometryError, Result, TessellationError};
use crate::geometry::spline::{offset_spline, spline_distances};
use crate::geometry::Pose;
use crate::math::{up, xz, Vector3, TOLERANCE};
use crate::profile::{LateralProfile, RoadMarking, RoadMaterial};

use super::{MeshPiece, TriangleMesh};

/// Which part of the dash pattern follows a dashed path sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashCap {
    /// A painted dash starts here.
    Start,
    /// A gap starts here.
    End,
}

/// Position of a dashed path sample as a fractional index into the path it
/// was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashPoint {
    pub index: f64,
    pub cap: DashCap,
}

/// A path subdivided at every dash boundary.
///
/// Every original sample is kept with an integral index, and boundary
/// samples are interpolated between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashedPath {
    pub samples: Vec<Pose>,
    pub points: Vec<DashPoint>,
}

impl DashedPath {
    /// The path itself, all gap.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn undivided(path: &[Pose]) -> Self {
        Self {
            samples: path.to_vec(),
            points: (0..path.len())
                .map(|i| DashPoint {
                    index: i as f64,
                    cap: DashCap::End,
                })
                .collect(),
        }
    }
}

/// Subdivides `path` at the dash and gap boundaries of `marking`.
///
/// The pattern starts `beginning_offset` (modulo the dash length) along the
/// path with a dash.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn dash_samples(path: &[Pose], marking: &RoadMarking) -> DashedPath {
    if path.len() < 2 || marking.dash_length + marking.separation_distance <= TOLERANCE {
        return DashedPath::undivided(path);
    }
    let distances = spline_distances(path);
    let mut boundary = if marking.dash_length > 0.0 {
        marking.beginning_offset.rem_euclid(marking.dash_length)
    } else {
        0.0
    };
    let mut cap = DashCap::Start;
    let mut active = DashCap::End;

    let mut dashed = DashedPath {
        samples: vec![path[0]],
        points: vec![DashPoint {
            index: 0.0,
            cap: DashCap::End,
        }],
    };
    for i in 1..path.len() {
        let (prev, next) = (distances[i - 1], distances[i]);
        let between = next - prev;
        while boundary < next {
            // Boundaries on an original sample retag that sample.
            if boundary - prev <= TOLERANCE {
                if let Some(last) = dashed.points.last_mut() {
                    last.cap = cap;
                }
            } else if next - boundary > TOLERANCE {
                let t = (boundary - prev) / between;
                dashed.samples.push(path[i - 1].lerp(&path[i], t));
                dashed.points.push(DashPoint {
                    index: (i - 1) as f64 + t,
                    cap,
                });
            }
            active = cap;
            (boundary, cap) = match cap {
                DashCap::Start => (boundary + marking.dash_length, DashCap::End),
                DashCap::End => (boundary + marking.separation_distance, DashCap::Start),
            };
        }
        dashed.samples.push(path[i]);
        dashed.points.push(DashPoint {
            index: i as f64,
            cap: active,
        });
    }
    dashed
}

/// Builds the mesh of one lane line along a road.
///
/// Solid lines give one strip in the marking material. Dashed lines give the
/// dashes in the marking material and the gaps between them as road surface.
#[derive(Debug)]
pub struct LoftRoadMarking<'a> {
    path: &'a [Pose],
    profile: &'a LateralProfile,
    marking: usize,
}

impl<'a> LoftRoadMarking<'a> {
    #[must_use]
    pub fn new(path: &'a [Pose], profile: &'a LateralProfile, marking: usize) -> Self {
        Self {
            path,
            profile,
            marking,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the path has fewer than two samples or the
    /// marking index is out of range.
    pub fn execute(&self) -> Result<Vec<MeshPiece>> {
        if self.path.len() < 2 {
            return Err(GeometryError::TooFewSamples {
                required: 2,
                actual: self.path.len(),
            }
            .into());
        }
        let marking = self.profile.markings.get(self.marking).ok_or_else(|| {
            TessellationError::InvalidInput(format!("no road marking {}", self.marking))
        })?;
        let x = self
            .profile
            .surfaces
            .get(marking.right_surface)
            .and_then(|s| self.profile.samples.get(s.start_index))
            .map(|s| s.x)
            .ok_or_else(|| {
                TessellationError::InvalidInput(format!(
                    "road marking {} borders no surface",
                    self.marking
                ))
            })?;

        if marking.is_dashed() {
            let dashed = dash_samples(self.path, marking);
            let (dashes, gaps) = dashed_strips(&dashed.samples, &dashed.points, x, marking.width);
            Ok(vec![
                MeshPiece::new(marking.material, dashes),
                MeshPiece::new(RoadMaterial::RoadSurface, gaps),
            ])
        } else {
            Ok(vec![MeshPiece::new(
                marking.material,
                solid_strip(self.path, x, marking.width),
            )])
        }
    }
}

fn push_edge_vertex(mesh: &mut TriangleMesh, pose: &Pose) -> u32 {
    mesh.push_vertex(pose.position, pose.rotation * up(), xz(&pose.position))
}

fn push_quad(mesh: &mut TriangleMesh, base: u32) {
    mesh.indices.push([base, base + 3, base + 1]);
    mesh.indices.push([base, base + 2, base + 3]);
}

fn solid_strip(path: &[Pose], x: f64, width: f64) -> TriangleMesh {
    let half = width / 2.0;
    let left = offset_spline(path, &Vector3::new(x - half, 0.0, 0.0));
    let right = offset_spline(path, &Vector3::new(x + half, 0.0, 0.0));
    let mut mesh = TriangleMesh::default();
    for (l, r) in left.iter().zip(&right) {
        push_edge_vertex(&mut mesh, l);
        push_edge_vertex(&mut mesh, r);
    }
    for i in 0..path.len() - 1 {
        #[allow(clippy::cast_possible_truncation)]
        push_quad(&mut mesh, (i * 2) as u32);
    }
    mesh
}

fn dashed_strips(
    samples: &[Pose],
    points: &[DashPoint],
    x: f64,
    width: f64,
) -> (TriangleMesh, TriangleMesh) {
    let half = width / 2.0;
    let left = offset_spline(samples, &Vector3::new(x - half, 0.0, 0.0));
    let right = offset_spline(samples, &Vector3::new(x + half, 0.0, 0.0));
    let mut dashes = TriangleMesh::default();
    let mut gaps = TriangleMesh::default();
    for i in 0..samples.len().saturating_sub(1) {
        let mesh = if points[i].cap == DashCap::Start {
            &mut dashes
        } else {
            &mut gaps
        };
        let base = push_edge_vertex(mesh, &left[i]);
        push_edge_vertex(mesh, &right[i]);
        push_edge_vertex(mesh, &left[i + 1]);
        push_edge_vertex(mesh, &right[i + 1]);
        push_quad(mesh, base);
    }
    (dashes, gaps)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::spline::positions_to_poses;
    use crate::math::Point3;

    fn straight(length: f64, samples: usize) -> Vec<Pose> {
        let points: Vec<Point3> = (0..samples)
            .map(|i| Point3::new(0.0, 0.0, length * i as f64 / (samples - 1) as f64))
            .collect();
        positions_to_poses(&points, false)
    }

    fn dashed(dash: f64, gap: f64, offset: f64) -> RoadMarking {
        RoadMarking::dashed(RoadMaterial::WhiteLaneLine, 0.2, dash, gap, offset)
    }

    #[test]
    fn dash_boundaries_are_inserted() {
        let path = straight(10.0, 3);
        let dashed = dash_samples(&path, &dashed(2.0, 3.0, 1.0));
        let indices: Vec<f64> = dashed.points.iter().map(|p| p.index).collect();
        let expected = [0.0, 0.2, 0.6, 1.0, 1.2, 1.6, 2.0];
        assert_eq!(indices.len(), expected.len());
        for (a, b) in indices.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{indices:?}");
        }
        let caps: Vec<DashCap> = dashed.points.iter().map(|p| p.cap).collect();
        assert_eq!(
            caps,
            vec![
                DashCap::End,
                DashCap::Start,
                DashCap::End,
                DashCap::End,
                DashCap::Start,
                DashCap::End,
                DashCap::End,
            ]
        );
        assert!((dashed.samples[1].position.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn boundaries_on_samples_retag_them() {
        let path = straight(10.0, 3);
        let dashed = dash_samples(&path, &dashed(2.5, 2.5, 0.0));
        let indices: Vec<f64> = dashed.points.iter().map(|p| p.index).collect();
        let expected = [0.0, 0.5, 1.0, 1.5, 2.0];
        assert_eq!(indices.len(), expected.len(), "{indices:?}");
        for (a, b) in indices.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{indices:?}");
        }
        let caps: Vec<DashCap> = dashed.points.iter().map(|p| p.cap).collect();
        assert_eq!(
            caps,
            vec![
                DashCap::Start,
                DashCap::End,
                DashCap::Start,
                DashCap::End,
                DashCap::End,
            ]
        );
        for pair in dashed.samples.windows(2) {
            assert!((pair[1].position - pair[0].position).norm() > 1e-6);
        }
    }

    #[test]
    fn beginning_offset_wraps_by_dash_length() {
        let path = straight(10.0, 2);
        let a = dash_samples(&path, &dashed(2.0, 3.0, 1.0));
        let b = dash_samples(&path, &dashed(2.0, 3.0, 5.0));
        assert_eq!(a, b);
    }

    #[test]
    fn solid_line_is_one_strip() {
        let path = straight(10.0, 4);
        let mut profile = crate::profile::LateralProfileBuilder::new();
        profile.add_road(3.0, 0.0);
        profile.switch_sides();
        profile.add_road(3.0, 0.0);
        let mut profile = profile.complete();
        profile.add_road_marking(0, RoadMarking::solid(RoadMaterial::YellowLaneLine, 0.2));

        let pieces = LoftRoadMarking::new(&path, &profile, 0).execute().unwrap();
        assert_eq!(pieces.len(), 1);
        let mesh = &pieces[0].mesh;
        assert_eq!(pieces[0].material, RoadMaterial::YellowLaneLine);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 6);
        assert!((mesh.vertices[0].x + 0.1).abs() < 1e-9);
        assert!((mesh.vertices[1].x - 0.1).abs() < 1e-9);
        assert!((mesh.normals[0] - Vector3::y()).norm() < 1e-9);
    }

    #[test]
    fn dashed_line_splits_dashes_and_gaps() {
        let path = straight(10.0, 3);
        let mut profile = crate::profile::LateralProfileBuilder::new();
        profile.add_road(3.0, 0.0);
        profile.switch_sides();
        profile.add_road(3.0, 0.0);
        let mut profile = profile.complete();
        profile.add_road_marking(0, dashed(2.0, 3.0, 1.0));

        let pieces = LoftRoadMarking::new(&path, &profile, 0).execute().unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].material, RoadMaterial::WhiteLaneLine);
        assert_eq!(pieces[1].material, RoadMaterial::RoadSurface);
        // Six segments, two of them dashes.
        assert_eq!(pieces[0].mesh.triangle_count(), 4);
        assert_eq!(pieces[1].mesh.triangle_count(), 8);
    }

    #[test]
    fn short_path_is_rejected() {
        let path = straight(10.0, 2);
        let profile = LateralProfile::default();
        assert!(LoftRoadMarking::new(&path[..1], &profile, 0).execute().is_err());
    }
}
