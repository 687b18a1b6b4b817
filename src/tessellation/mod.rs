mod assemble;
mod intersection;
mod loft;
mod marking;

pub use assemble::{AssembleRoadMesh, RoadMesh, SubMeshRange};
pub use intersection::TessellateContour;
pub use loft::LoftSurface;
pub use marking::{dash_samples, DashCap, DashPoint, DashedPath, LoftRoadMarking};

use crate::math::{Point2, Point3, Vector3};
use crate::profile::RoadMaterial;

/// A triangle mesh approximation of a surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends one vertex and returns its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_vertex(&mut self, position: Point3, normal: Vector3, uv: Point2) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        index
    }

    /// Appends `other`, shifting its indices past the existing vertices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
    }
}

/// A mesh rendered with a single material.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPiece {
    pub material: RoadMaterial,
    pub mesh: TriangleMesh,
}

impl MeshPiece {
    #[must_use]
    pub fn new(material: RoadMaterial, mesh: TriangleMesh) -> Self {
        Self { material, mesh }
    }
}
