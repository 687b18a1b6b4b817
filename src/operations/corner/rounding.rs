use tracing::warn;

use crate::error::{CornerError, Result};
use crate::geometry::{slerp, Pose};
use crate::math::{angle_2d, from_xz, xz_vec, Point3, Vector3, TOLERANCE};
use crate::network::{CornerId, IntersectionId};

use super::solver::{RoundedCornerSolver, SolveOutcome};

/// Solved rounding of one corner.
#[derive(Debug, Clone)]
pub struct RoundedCornerGeometry {
    pub center: Point3,
    pub left_tangent: Pose,
    pub right_tangent: Pose,
    pub tangent_left_index: f64,
    pub tangent_right_index: f64,
    /// Arc samples from the right tangent to the left tangent.
    pub arc: Vec<Pose>,
}

/// Inscribes a circle of the corner's radius between its two edges and
/// samples the arc joining the tangent points.
#[derive(Debug)]
pub struct RoundCorner<'a> {
    corner: CornerId,
    intersection: IntersectionId,
    left: &'a [Pose],
    right: &'a [Pose],
    radius: f64,
    samples_per_meter: f64,
}

impl<'a> RoundCorner<'a> {
    #[must_use]
    pub fn new(
        corner: CornerId,
        intersection: IntersectionId,
        left: &'a [Pose],
        right: &'a [Pose],
        radius: f64,
        samples_per_meter: f64,
    ) -> Self {
        Self {
            corner,
            intersection,
            left,
            right,
            radius,
            samples_per_meter,
        }
    }

    /// Solves the corner.
    ///
    /// # Errors
    ///
    /// Returns [`CornerError::CannotInscribe`] when no pair of edge segments
    /// can hold the radius, or [`CornerError::EdgesDoNotIntersect`] when the
    /// edges never cross.
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<RoundedCornerGeometry> {
        let outcome = RoundedCornerSolver::new(self.left, self.right, self.radius).solve();
        let (solved, i, j, j_forward) = match outcome {
            SolveOutcome::Solved {
                corner,
                left_idx,
                right_idx,
                right_idx_forward,
            } => (corner, left_idx, right_idx, right_idx_forward),
            SolveOutcome::NoCrossing => {
                warn!(corner = ?self.corner, "corner edges do not intersect");
                return Err(CornerError::EdgesDoNotIntersect {
                    corner: self.corner,
                }
                .into());
            }
            SolveOutcome::NoFit { crossing } => {
                warn!(
                    corner = ?self.corner,
                    radius = self.radius,
                    x = crossing.x,
                    y = crossing.y,
                    "cannot inscribe corner radius"
                );
                return Err(CornerError::CannotInscribe {
                    radius: self.radius,
                    corner: self.corner,
                    intersection: self.intersection,
                    location: crossing,
                }
                .into());
            }
        };

        let left1 = self.left[i - 1].xz();
        let left2 = self.left[i].xz();
        let right1 = self.right[j + 1].xz();
        let right2 = self.right[j].xz();

        let left_len = (left2 - left1).norm().max(f64::MIN_POSITIVE);
        let right_len = (right2 - right1).norm().max(f64::MIN_POSITIVE);

        // Tangent indices stay strictly inside their segment so truncation
        // recovers the segment.
        let tangent_left_index = ((i - 1) as f64 + (solved.left_tangent - left1).norm() / left_len)
            .clamp((i - 1) as f64 + TOLERANCE, i as f64 - TOLERANCE);
        let tangent_right_index = ((j_forward - 1) as f64
            + (solved.right_tangent - right1).norm() / right_len)
            .clamp((j_forward - 1) as f64 + TOLERANCE, j_forward as f64 - TOLERANCE);

        let left_tangent = self.left[i - 1].lerp(&self.left[i], tangent_left_index.fract());
        let right_tangent = self.right[j + 1].lerp(&self.right[j], tangent_right_index.fract());

        let center = from_xz(
            &solved.center,
            (left_tangent.position.y + right_tangent.position.y) / 2.0,
        );

        let arc = self.sample_arc(&center, &left_tangent, &right_tangent);

        Ok(RoundedCornerGeometry {
            center,
            left_tangent,
            right_tangent,
            tangent_left_index,
            tangent_right_index,
            arc,
        })
    }

    /// Samples the arc clockwise from the right tangent to the left tangent.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn sample_arc(&self, center: &Point3, left: &Pose, right: &Pose) -> Vec<Pose> {
        let v1 = left.position - center;
        let v2 = right.position - center;
        let angle = angle_2d::angle_between_vectors(&xz_vec(&v1), &xz_vec(&v2));
        let count = (self.samples_per_meter * angle * self.radius).max(0.0) as usize;
        let step = angle / (count + 1) as f64;
        let start = v2.z.atan2(v2.x);

        let mut arc = Vec::with_capacity(count + 2);
        arc.push(*right);
        for k in 1..=count {
            let a = start - step * k as f64;
            let offset = Vector3::new(a.cos(), 0.0, a.sin()) * self.radius;
            arc.push(Pose::new(
                center + offset,
                slerp(
                    &right.rotation,
                    &left.rotation,
                    k as f64 / (count + 1) as f64,
                ),
            ));
        }
        arc.push(*left);
        arc
    }
}
