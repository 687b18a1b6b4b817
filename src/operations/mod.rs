pub mod contour;
pub mod corner;
pub mod paths;
pub mod split;
pub mod topology;
