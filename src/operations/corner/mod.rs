mod edges;
mod iterators;
mod rounding;
pub mod solver;
mod stitch;

pub use edges::{BuildCornerEdges, CornerEdges};
pub use rounding::{RoundCorner, RoundedCornerGeometry};
pub use solver::{RoundedCorner, RoundedCornerSolver, SolveOutcome};
pub use stitch::{CornerOutline, StitchIntersectionOutline, StitchedIntersection};

use crate::error::Result;
use crate::network::{CornerId, RoadNetworkStore};
use crate::profile::LateralProfile;

/// Shoulder profile of a corner: everything right of the right road's
/// drivable span.
///
/// # Errors
///
/// Returns an error if the corner or its right road's profile is missing.
pub fn corner_profile(store: &RoadNetworkStore, corner: CornerId) -> Result<LateralProfile> {
    let right = store.corner(corner)?.right_road.road;
    Ok(store.road_profile(right)?.outer_right_section())
}
