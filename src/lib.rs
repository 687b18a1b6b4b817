pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod network;
pub mod operations;
pub mod pipeline;
pub mod profile;
pub mod tessellation;

pub use config::RoadBuilderParameters;
pub use error::{Result, RoadMeshError};
pub use pipeline::{RoadBuilder, RoadMeshOutput};
