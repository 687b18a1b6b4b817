mod crop;
mod elevation;
mod grid;
mod smooth;

pub use crop::crop_road;
pub use elevation::{interpolate_contour, raise_intersection_contours};
pub use grid::{road_inside_intersection, BuildContourGrid};
pub use smooth::smooth_corner_outline;
