use crate::geometry::look_rotation;
use crate::geometry::spline::bezier_blend;
use crate::math::Vector3;
use crate::network::ContourGrid;

/// Pulls the inside edges of all corner grids of one intersection toward the
/// intersection's average center height.
///
/// `grids` must be in corner order. The far ends of each road keep their
/// height; the center takes the average. Each corner's right half is copied
/// onto the left half of the previous corner so shared road centerlines stay
/// identical.
#[allow(clippy::cast_precision_loss)]
pub fn raise_intersection_contours(grids: &mut [ContourGrid]) {
    let n = grids.len();
    if n == 0 {
        return;
    }
    let cols = grids[0].size.1;
    let half = cols / 2;
    if half == 0 || grids.iter().any(|g| g.size.1 != cols) {
        return;
    }

    let weights: Vec<f64> = (0..=half)
        .map(|j| bezier_blend((half - j) as f64 / half as f64))
        .collect();

    let center_y = grids.iter().map(|g| g.point(0, half).y).sum::<f64>() / n as f64;

    let mut prev = n - 1;
    for i in 0..n {
        for (j, w) in weights.iter().enumerate() {
            let p = grids[i].point_mut(0, j);
            p.y = center_y + (p.y - center_y) * w;
        }
        for j in 0..=half {
            let p = *grids[i].point(0, j);
            *grids[prev].point_mut(0, cols - j - 1) = p;
        }
        prev = i;
    }
}

/// Blends the heights of the middle rows from the inside edge to the outline
/// and re-derives the inside edge orientations.
#[allow(clippy::cast_precision_loss)]
pub fn interpolate_contour(grid: &mut ContourGrid) {
    let (rows, cols) = grid.size;
    if rows < 2 {
        return;
    }
    for row in 1..rows - 1 {
        let w = bezier_blend(row as f64 / (rows - 1) as f64);
        for j in 0..cols {
            let inside = grid.point(0, j).y;
            let outside = grid.point(rows - 1, j).y;
            grid.point_mut(row, j).y = inside + (outside - inside) * w;
        }
    }

    for j in 1..cols.saturating_sub(1) {
        let prev = *grid.point(0, j - 1);
        let curr = *grid.point(0, j);
        let next = *grid.point(0, j + 1);
        let v1 = (curr - prev).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        let v2 = (next - curr).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        let edge = &mut grid.inside_edge[j];
        edge.position = curr;
        edge.rotation = look_rotation(&(v1 + v2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pose;
    use crate::math::Point3;

    fn flat_grid(rows: usize, cols: usize, inside_y: f64, outside_y: f64) -> ContourGrid {
        let mut points = Vec::new();
        for row in 0..rows {
            for j in 0..cols {
                let y = if row == rows - 1 { outside_y } else { inside_y };
                #[allow(clippy::cast_precision_loss)]
                points.push(Point3::new(j as f64, y, row as f64));
            }
        }
        ContourGrid {
            size: (rows, cols),
            inside_edge: (0..cols).map(|j| Pose::from_position(points[j])).collect(),
            outside_edge: Vec::new(),
            points,
        }
    }

    #[test]
    fn raise_meets_average_center() {
        let mut grids = vec![flat_grid(3, 5, 0.0, 0.0), flat_grid(3, 5, 2.0, 0.0)];
        raise_intersection_contours(&mut grids);
        for g in &grids {
            assert!((g.point(0, 2).y - 1.0).abs() < 1e-9);
        }
        // Far end of the right road keeps its height.
        assert!(grids[1].point(0, 0).y.abs() > 1.9);
        // Shared centerlines agree: corner 1's right half is corner 0's left half.
        for j in 0..=2 {
            assert_eq!(grids[1].point(0, j), grids[0].point(0, 4 - j));
        }
    }

    #[test]
    fn middle_rows_ease_toward_outline() {
        let mut grid = flat_grid(5, 3, 0.0, 1.0);
        interpolate_contour(&mut grid);
        let ys: Vec<f64> = (0..5).map(|row| grid.point(row, 1).y).collect();
        assert!(ys[0].abs() < 1e-12);
        assert!((ys[2] - 0.5).abs() < 1e-9);
        assert!((ys[4] - 1.0).abs() < 1e-12);
        for w in ys.windows(2) {
            assert!(w[1] >= w[0]);
        }
        // Inside edge along +x keeps facing +x.
        assert!(grid.inside_edge[1].forward().x > 0.99);
    }
}
