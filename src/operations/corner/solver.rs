use crate::geometry::Pose;
use crate::math::intersect_2d::{line_intersection_2d, segment_intersection_2d};
use crate::math::{angle_2d, Point2, Vector2};

use super::iterators::EdgeSegmentWalk;

/// A circle tangent to both road edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedCorner {
    pub center: Point2,
    pub left_tangent: Point2,
    pub right_tangent: Point2,
}

impl RoundedCorner {
    fn swapped(self) -> Self {
        Self {
            center: self.center,
            left_tangent: self.right_tangent,
            right_tangent: self.left_tangent,
        }
    }
}

/// Where the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveOutcome {
    /// The circle fits between left segment `left_idx - 1 -> left_idx` and
    /// right segment `right_idx + 1 -> right_idx`.
    Solved {
        corner: RoundedCorner,
        left_idx: usize,
        right_idx: usize,
        right_idx_forward: usize,
    },
    /// The edges never cross, so there is no corner to round.
    NoCrossing,
    /// The edges cross at `crossing` but no segment pair fits the radius.
    NoFit { crossing: Point2 },
}

/// Solves for the rounded corner between a left edge running out of an
/// intersection and a right edge running into it.
#[derive(Debug)]
pub struct RoundedCornerSolver<'a> {
    left: &'a [Pose],
    right: &'a [Pose],
    radius: f64,
}

impl<'a> RoundedCornerSolver<'a> {
    /// Creates a new solver. Both edges need at least two samples.
    #[must_use]
    pub fn new(left: &'a [Pose], right: &'a [Pose], radius: f64) -> Self {
        Self {
            left,
            right,
            radius,
        }
    }

    /// Finds where the edges cross, then walks outward from the crossing
    /// until a segment pair can hold the circle.
    #[must_use]
    pub fn solve(&self) -> SolveOutcome {
        if self.left.len() < 2 || self.right.len() < 2 {
            return SolveOutcome::NoCrossing;
        }

        let mut walk = EdgeSegmentWalk::new(self.left, self.right);
        let crossing = loop {
            let i = walk.left_idx;
            let j = walk.right_idx();
            if let Some(point) = segment_intersection_2d(
                &self.left[i - 1].xz(),
                &self.left[i].xz(),
                &self.right[j + 1].xz(),
                &self.right[j].xz(),
            ) {
                break Some((point, i, j));
            }
            if !walk.advance() {
                break None;
            }
        };
        let Some((crossing, crossing_left, crossing_right)) = crossing else {
            return SolveOutcome::NoCrossing;
        };

        let mut walk = EdgeSegmentWalk::from_crossing(
            self.left,
            self.right,
            crossing_left,
            crossing_right,
            &crossing,
        );
        loop {
            if let Some(corner) =
                self.inscribe(&walk, &crossing, crossing_left, crossing_right)
            {
                return SolveOutcome::Solved {
                    corner,
                    left_idx: walk.left_idx,
                    right_idx: walk.right_idx(),
                    right_idx_forward: walk.right_idx_forward,
                };
            }
            if !walk.advance() {
                return SolveOutcome::NoFit { crossing };
            }
        }
    }

    fn inscribe(
        &self,
        walk: &EdgeSegmentWalk<'_>,
        crossing: &Point2,
        crossing_left: usize,
        crossing_right: usize,
    ) -> Option<RoundedCorner> {
        let i = walk.left_idx;
        let j = walk.right_idx();
        let radius = self.radius;

        let ls1 = if i == crossing_left {
            *crossing
        } else {
            self.left[i - 1].xz()
        };
        let ls2 = self.left[i].xz();
        let rs1 = if j == crossing_right {
            *crossing
        } else {
            self.right[j + 1].xz()
        };
        let rs2 = self.right[j].xz();

        let lv = normalize(&(ls2 - ls1));
        let rv = normalize(&(rs2 - rs1));

        // The left edge must turn counter-clockwise away from the right edge.
        if lv.y * rv.x - lv.x * rv.y <= 0.0 {
            return None;
        }

        let apex = line_intersection_2d(&ls1, &ls2, &rs1, &rs2)?;
        let half = angle_2d::angle_between_vectors(&rv, &lv) / 2.0;
        let tan = half.tan();

        let left_min = (apex - ls1).norm() * tan;
        let left_max = (apex - ls2).norm() * tan;
        let right_min = (apex - rs1).norm() * tan;
        let right_max = (apex - rs2).norm() * tan;

        if left_min <= radius && radius <= left_max && right_min <= radius && radius <= right_max
        {
            let tangent_dist = radius / tan;
            let center_dist = radius / half.sin();
            return Some(RoundedCorner {
                center: apex + normalize(&(lv + rv)) * center_dist,
                left_tangent: apex + lv * tangent_dist,
                right_tangent: apex + rv * tangent_dist,
            });
        }

        let ls3 = self.left.get(i + 1).map(Pose::xz);
        if let Some(ls3) = ls3 {
            let lv2 = normalize(&(ls3 - ls2));
            if let Some(apex2) = line_intersection_2d(&ls2, &ls3, &rs1, &rs2) {
                let tan2 = (angle_2d::angle_between_vectors(&rv, &lv2) / 2.0).tan();
                let left_min2 = (apex2 - ls2).norm() * tan2;
                if radius > left_max && radius < left_min2 {
                    if let Some(corner) = check_pivot(&ls2, &rs1, &rs2, radius) {
                        return Some(corner);
                    }
                }
            }
        }

        let rs3 = j.checked_sub(1).map(|k| self.right[k].xz());
        if let Some(rs3) = rs3 {
            let rv2 = normalize(&(rs3 - rs2));
            if let Some(apex3) = line_intersection_2d(&ls1, &ls2, &rs2, &rs3) {
                let tan3 = (angle_2d::angle_between_vectors(&rv2, &lv) / 2.0).tan();
                let right_min3 = (apex3 - rs2).norm() * tan3;
                if radius > right_max && radius < right_min3 {
                    if let Some(corner) = check_pivot(&rs2, &ls1, &ls2, radius) {
                        return Some(corner.swapped());
                    }
                }
            }
        }

        let (ls3, rs3) = (ls3?, rs3?);
        pivot_both(&ls2, &ls3, &rs2, &rs3, radius, left_max, right_max)
    }
}

/// Circle pinned to both segment ends at once.
fn pivot_both(
    ls2: &Point2,
    ls3: &Point2,
    rs2: &Point2,
    rs3: &Point2,
    radius: f64,
    left_max: f64,
    right_max: f64,
) -> Option<RoundedCorner> {
    let mid = Point2::from((ls2.coords + rs2.coords) / 2.0);
    let half_dist = (ls2 - rs2).norm() / 2.0;

    let across = normalize(&(ls2 - rs2));
    let next = normalize(&(rs3 - rs2));
    let next = Vector2::new(-next.y, next.x);
    let right_angle = angle_2d::signed_angle_between_vectors(&next, &across);
    let normal = Vector2::new(across.y, -across.x);
    let right_min = (rs2 - (mid + normal * right_angle.tan() * half_dist)).norm();

    let across = normalize(&(rs2 - ls2));
    let next = normalize(&(ls3 - ls2));
    let next = Vector2::new(next.y, -next.x);
    let left_angle = angle_2d::signed_angle_between_vectors(&across, &next);
    let normal = Vector2::new(-across.y, across.x);
    let left_min = (ls2 - (mid + normal * left_angle.tan() * half_dist)).norm();

    if right_angle > 0.0
        && left_angle > 0.0
        && left_max < radius
        && radius < left_min
        && right_max < radius
        && radius < right_min
    {
        let perp = Vector2::new(-across.y, across.x);
        let offset = (radius * radius - (mid - rs2).norm_squared()).sqrt();
        return Some(RoundedCorner {
            center: mid + perp * offset,
            left_tangent: *ls2,
            right_tangent: *rs2,
        });
    }
    None
}

/// Circle through `pivot` tangent to the line `line1 -> line2`, with its
/// tangent point inside the segment.
///
/// The result's left tangent is the pivot and its right tangent lies on the
/// segment.
#[must_use]
pub fn check_pivot(
    pivot: &Point2,
    line1: &Point2,
    line2: &Point2,
    radius: f64,
) -> Option<RoundedCorner> {
    let along = line2 - line1;
    let angle = angle_2d::heading(&along);
    let (sin, cos) = angle.sin_cos();
    let to_local = |v: Vector2| Vector2::new(cos * v.x + sin * v.y, -sin * v.x + cos * v.y);
    let to_world = |v: Vector2| Vector2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y);

    let along = to_local(along);
    let pivot_local = to_local(pivot - line1);
    if pivot_local.y.abs() < f64::EPSILON {
        return None;
    }

    let signed_radius = pivot_local.y.signum() * radius;
    let pivot_angle = ((pivot_local.y - signed_radius) / signed_radius).asin();
    let tangent_x = pivot_local.x + pivot_angle.cos() * radius;

    if tangent_x >= 0.0 && tangent_x <= along.x {
        return Some(RoundedCorner {
            center: line1 + to_world(Vector2::new(tangent_x, signed_radius)),
            left_tangent: *pivot,
            right_tangent: line1 + to_world(Vector2::new(tangent_x, 0.0)),
        });
    }
    None
}

fn normalize(v: &Vector2) -> Vector2 {
    v.try_normalize(0.0).unwrap_or_else(Vector2::zeros)
}
