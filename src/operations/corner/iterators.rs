use crate::geometry::Pose;
use crate::math::Point2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    Left,
    Right,
}

/// Enumerates `(left segment, right segment)` pairs in order of growing
/// distance from the intersection.
///
/// The left edge runs out of the intersection, so its segments are visited
/// front to back. The right edge runs into it, so its segments are visited
/// back to front. Every time one side grows by a segment, that segment is
/// paired with each segment already reached on the other side.
#[derive(Debug, Clone)]
pub(crate) struct EdgeSegmentWalk<'a> {
    left: &'a [Pose],
    right: &'a [Pose],
    max_left: usize,
    max_right: usize,
    left_start: usize,
    right_start: usize,
    last_left: usize,
    last_right: usize,
    left_dist: f64,
    right_dist: f64,
    /// Current left segment end sample.
    pub left_idx: usize,
    /// Current right segment, counted from the intersection end.
    pub right_idx_forward: usize,
}

impl<'a> EdgeSegmentWalk<'a> {
    /// Starts at the first segment of both edges.
    pub(crate) fn new(left: &'a [Pose], right: &'a [Pose]) -> Self {
        let mut walk = Self {
            left,
            right,
            max_left: 1,
            max_right: 1,
            left_start: 1,
            right_start: 1,
            last_left: left.len() - 1,
            last_right: right.len() - 1,
            left_dist: 0.0,
            right_dist: 0.0,
            left_idx: 1,
            right_idx_forward: 1,
        };
        walk.add_left_dist();
        walk.add_right_dist();
        walk
    }

    /// Starts at the segment pair where the edges cross at `intersection`.
    ///
    /// `right_idx` is the right segment's start sample in the right edge's
    /// own order.
    pub(crate) fn from_crossing(
        left: &'a [Pose],
        right: &'a [Pose],
        left_idx: usize,
        right_idx: usize,
        intersection: &Point2,
    ) -> Self {
        let last_right = right.len() - 1;
        let right_start = last_right - right_idx;
        let mut walk = Self {
            left,
            right,
            max_left: left_idx,
            max_right: right_start,
            left_start: left_idx,
            right_start,
            last_left: left.len() - 1,
            last_right,
            left_dist: 0.0,
            right_dist: 0.0,
            left_idx,
            right_idx_forward: right_start,
        };
        walk.left_dist += (intersection - left[walk.max_left].xz()).norm();
        walk.right_dist += (right[walk.right_idx()].xz() - intersection).norm();
        walk
    }

    /// Start sample of the current right segment in the right edge's order.
    ///
    /// The segment runs from `right_idx() + 1` to `right_idx()`.
    pub(crate) fn right_idx(&self) -> usize {
        self.last_right - self.right_idx_forward
    }

    fn add_left_dist(&mut self) {
        self.left_dist += (self.left[self.max_left].position
            - self.left[self.max_left - 1].position)
            .norm();
    }

    fn add_right_dist(&mut self) {
        let idx = self.last_right - self.max_right;
        self.right_dist += (self.right[idx].position - self.right[idx + 1].position).norm();
    }

    /// Moves to the next segment pair. Returns `false` once every pair has
    /// been visited.
    pub(crate) fn advance(&mut self) -> bool {
        if self.max_left == self.last_left
            && self.max_right == self.last_right
            && self.left_idx == self.max_left
            && self.right_idx_forward == self.max_right
        {
            return false;
        }

        if self.left_idx < self.max_left {
            self.left_idx += 1;
            return true;
        }
        if self.right_idx_forward < self.max_right {
            self.right_idx_forward += 1;
            return true;
        }

        let side = if self.max_left == self.last_left {
            self.max_right += 1;
            Advance::Right
        } else if self.max_right == self.last_right {
            self.max_left += 1;
            Advance::Left
        } else if self.right_dist < self.left_dist {
            self.max_right += 1;
            self.add_right_dist();
            Advance::Right
        } else {
            self.max_left += 1;
            self.add_left_dist();
            Advance::Left
        };

        match side {
            Advance::Left => {
                self.left_idx = self.max_left;
                self.right_idx_forward = self.right_start;
            }
            Advance::Right => {
                self.left_idx = self.left_start;
                self.right_idx_forward = self.max_right;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn line(dir: (f64, f64), n: usize) -> Vec<Pose> {
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f64;
                Pose::from_position(Point3::new(dir.0 * t, 0.0, dir.1 * t))
            })
            .collect()
    }

    #[test]
    fn visits_pairs_in_expanding_order() {
        let left = line((0.0, 1.0), 4);
        let right = line((1.0, 0.0), 4);
        let mut walk = EdgeSegmentWalk::new(&left, &right);
        let mut visited = Vec::new();
        loop {
            visited.push((walk.left_idx, walk.right_idx_forward));
            if !walk.advance() {
                break;
            }
        }
        assert_eq!(
            visited,
            vec![
                (1, 1),
                (2, 1),
                (1, 2),
                (2, 2),
                (3, 1),
                (3, 2),
                (1, 3),
                (2, 3),
                (3, 3)
            ]
        );
    }

    #[test]
    fn single_segment_edges_visit_once() {
        let left = line((0.0, 1.0), 2);
        let right = line((1.0, 0.0), 2);
        let mut walk = EdgeSegmentWalk::new(&left, &right);
        assert_eq!((walk.left_idx, walk.right_idx()), (1, 0));
        assert!(!walk.advance());
    }

    #[test]
    fn crossing_start_resumes_at_crossing_segments() {
        let left = line((0.0, 1.0), 4);
        let right = line((1.0, 0.0), 4);
        let walk = EdgeSegmentWalk::from_crossing(&left, &right, 2, 1, &Point2::new(0.0, 1.5));
        assert_eq!(walk.left_idx, 2);
        assert_eq!(walk.right_idx(), 1);
        assert_eq!(walk.right_idx_forward, 2);
    }
}
