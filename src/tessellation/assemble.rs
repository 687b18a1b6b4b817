use std::collections::BTreeMap;

use tracing::debug;

use crate::profile::RoadMaterial;

use super::{MeshPiece, TriangleMesh};

/// A contiguous range of [`RoadMesh::mesh`] rendered with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMeshRange {
    pub material: RoadMaterial,
    pub vertex_start: usize,
    pub vertex_count: usize,
    pub triangle_start: usize,
    pub triangle_count: usize,
}

/// The combined road network mesh.
///
/// Vertices and triangles are grouped by material in id order. Triangle
/// indices address the combined vertex buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadMesh {
    pub mesh: TriangleMesh,
    pub submeshes: Vec<SubMeshRange>,
}

impl RoadMesh {
    /// Materials present in the mesh, in id order.
    pub fn materials(&self) -> impl Iterator<Item = RoadMaterial> + '_ {
        self.submeshes.iter().map(|s| s.material)
    }

    /// Copy of the part rendered with `material`, indices rebased to its own
    /// vertices.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn submesh(&self, material: RoadMaterial) -> Option<TriangleMesh> {
        let range = self.submeshes.iter().find(|s| s.material == material)?;
        let vertices = range.vertex_start..range.vertex_start + range.vertex_count;
        let offset = range.vertex_start as u32;
        Some(TriangleMesh {
            vertices: self.mesh.vertices[vertices.clone()].to_vec(),
            normals: self.mesh.normals[vertices.clone()].to_vec(),
            uvs: self.mesh.uvs[vertices].to_vec(),
            indices: self.mesh.indices
                [range.triangle_start..range.triangle_start + range.triangle_count]
                .iter()
                .map(|t| [t[0] - offset, t[1] - offset, t[2] - offset])
                .collect(),
        })
    }
}

/// Merges mesh pieces into one [`RoadMesh`] with a single range per
/// material.
#[derive(Debug)]
pub struct AssembleRoadMesh {
    pieces: Vec<MeshPiece>,
}

impl AssembleRoadMesh {
    #[must_use]
    pub fn new(pieces: Vec<MeshPiece>) -> Self {
        Self { pieces }
    }

    /// Pieces without triangles are dropped.
    #[must_use]
    pub fn execute(self) -> RoadMesh {
        let mut by_material: BTreeMap<RoadMaterial, Vec<TriangleMesh>> = BTreeMap::new();
        for piece in self.pieces {
            if !piece.mesh.is_empty() {
                by_material.entry(piece.material).or_default().push(piece.mesh);
            }
        }

        let mut result = RoadMesh::default();
        for (material, meshes) in by_material {
            let vertex_start = result.mesh.vertex_count();
            let triangle_start = result.mesh.triangle_count();
            for mesh in &meshes {
                result.mesh.merge(mesh);
            }
            result.submeshes.push(SubMeshRange {
                material,
                vertex_start,
                vertex_count: result.mesh.vertex_count() - vertex_start,
                triangle_start,
                triangle_count: result.mesh.triangle_count() - triangle_start,
            });
            debug!(
                material = material.label(),
                pieces = meshes.len(),
                triangles = result.mesh.triangle_count() - triangle_start,
                "assembled submesh"
            );
        }
        result
    }
}
