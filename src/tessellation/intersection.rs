use crate::error::{Result, TessellationError};
use crate::geometry::slerp;
use crate::math::{up, xz};
use crate::network::ContourGrid;

use super::TriangleMesh;

/// Triangulates a corner's contour grid into the intersection surface.
///
/// Normals turn from the inside edge orientation to the outline orientation
/// row by row. The grid point at the intersection center faces straight up.
#[derive(Debug)]
pub struct TessellateContour<'a> {
    grid: &'a ContourGrid,
}

impl<'a> TessellateContour<'a> {
    #[must_use]
    pub fn new(grid: &'a ContourGrid) -> Self {
        Self { grid }
    }

    /// # Errors
    ///
    /// Returns an error if the grid is smaller than 2x2 or its point and
    /// edge buffers do not match its size.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let grid = self.grid;
        let (rows, cols) = grid.size;
        if rows < 2
            || cols < 2
            || grid.points.len() != rows * cols
            || grid.inside_edge.len() < cols
            || grid.outside_edge.len() < cols
        {
            return Err(TessellationError::InvalidInput(format!(
                "contour grid {rows}x{cols} has {} points, {} inside and {} outside edge samples",
                grid.points.len(),
                grid.inside_edge.len(),
                grid.outside_edge.len()
            ))
            .into());
        }

        let mut mesh = TriangleMesh::default();
        for row in 0..rows {
            let t = row as f64 / (rows - 1) as f64;
            for j in 0..cols {
                let inside = &grid.inside_edge[j].rotation;
                let outside = &grid.outside_edge[j].rotation;
                let rotation = if row == 0 {
                    *inside
                } else if row == rows - 1 {
                    *outside
                } else {
                    slerp(inside, outside, t)
                };
                let position = *grid.point(row, j);
                mesh.push_vertex(position, rotation * up(), xz(&position));
            }
        }
        mesh.normals[cols / 2] = up();

        let cols = cols as u32;
        for row in 1..rows as u32 {
            let o1 = (row - 1) * cols;
            let o2 = o1 + cols;
            for k in 1..cols {
                let j = k - 1;
                mesh.indices.push([o1 + j, o1 + k, o2 + j]);
                mesh.indices.push([o1 + k, o2 + k, o2 + j]);
            }
        }
        Ok(mesh)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{look_rotation, Pose};
    use crate::math::{Point3, Vector3};

    fn grid(rows: usize, cols: usize) -> ContourGrid {
        let mut points = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                points.push(Point3::new(c as f64, 0.0, r as f64));
            }
        }
        let tilted = look_rotation(&Vector3::new(1.0, 0.5, 0.0));
        ContourGrid {
            size: (rows, cols),
            points,
            inside_edge: vec![Pose::new(Point3::origin(), tilted); cols],
            outside_edge: vec![Pose::from_position(Point3::origin()); cols],
        }
    }

    #[test]
    fn grid_becomes_quads() {
        let mesh = TessellateContour::new(&grid(3, 5)).execute().unwrap();
        assert_eq!(mesh.vertex_count(), 15);
        assert_eq!(mesh.triangle_count(), 16);
        assert_eq!(mesh.indices[0], [0, 1, 5]);
        assert_eq!(mesh.indices[1], [1, 6, 5]);
        assert!((mesh.uvs[7].x - 2.0).abs() < 1e-12);
        assert!((mesh.uvs[7].y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normals_blend_inside_to_outside() {
        let mesh = TessellateContour::new(&grid(3, 5)).execute().unwrap();
        assert!((mesh.normals[2] - Vector3::y()).norm() < 1e-12);
        assert!(mesh.normals[0].x < -0.1);
        assert!((mesh.normals[10] - Vector3::y()).norm() < 1e-12);
        let middle = mesh.normals[5];
        assert!(middle.x < 0.0 && middle.x > mesh.normals[0].x);
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let mut g = grid(3, 5);
        g.points.pop();
        assert!(TessellateContour::new(&g).execute().is_err());
    }
}
