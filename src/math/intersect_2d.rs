use super::{Point2, TOLERANCE};

/// Intersection of the infinite lines through `p0 -> p1` and `p2 -> p3`.
///
/// Returns `None` for parallel or collinear lines.
#[must_use]
pub fn line_intersection_2d(p0: &Point2, p1: &Point2, p2: &Point2, p3: &Point2) -> Option<Point2> {
    let s1 = p1 - p0;
    let s2 = p3 - p2;

    let det = -s2.x * s1.y + s1.x * s2.y;
    if det.abs() < TOLERANCE {
        return None;
    }

    let t = (s2.x * (p0.y - p2.y) - s2.y * (p0.x - p2.x)) / det;
    Some(p0 + s1 * t)
}

/// Bounded segment-segment intersection in 2D.
///
/// Both segment parameters must fall in `[0, 1]`. Parallel and collinear
/// segments never intersect.
#[must_use]
pub fn segment_intersection_2d(
    p0: &Point2,
    p1: &Point2,
    p2: &Point2,
    p3: &Point2,
) -> Option<Point2> {
    let s1 = p1 - p0;
    let s2 = p3 - p2;

    let det = -s2.x * s1.y + s1.x * s2.y;
    if det.abs() < TOLERANCE {
        return None;
    }

    let s = (-s1.y * (p0.x - p2.x) + s1.x * (p0.y - p2.y)) / det;
    let t = (s2.x * (p0.y - p2.y) - s2.y * (p0.x - p2.x)) / det;

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(p0 + s1 * t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_lines() {
        let hit = line_intersection_2d(
            &Point2::new(0.0, -1.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(5.0, 3.0),
            &Point2::new(4.0, 3.0),
        )
        .unwrap();
        assert!((hit - Point2::new(0.0, 3.0)).norm() < TOLERANCE);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 1.0);
        assert!(line_intersection_2d(&a, &b, &Point2::new(0.0, 1.0), &Point2::new(1.0, 2.0)).is_none());
        // Collinear
        assert!(segment_intersection_2d(&a, &b, &Point2::new(0.5, 0.5), &Point2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn segments_out_of_range() {
        let hit = segment_intersection_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, -1.0),
            &Point2::new(2.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn segments_touching_at_endpoint() {
        let hit = segment_intersection_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(10.0, 0.0),
            &Point2::new(0.0, 0.0),
        )
        .unwrap();
        assert!(hit.coords.norm() < TOLERANCE);
    }
}
