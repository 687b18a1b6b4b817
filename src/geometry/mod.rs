pub mod pose;
pub mod spline;

pub use pose::{look_rotation, nlerp, slerp, Pose};
pub use spline::SplineInterpolator;
