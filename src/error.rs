use thiserror::Error;

use crate::math::Point2;
use crate::network::{CornerId, IntersectionId};

/// Top-level error type for road mesh generation.
#[derive(Debug, Error)]
pub enum RoadMeshError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Corner(#[from] CornerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("spline needs at least {required} samples, got {actual}")]
    TooFewSamples { required: usize, actual: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised by stale handles into the network store.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("road not found")]
    RoadNotFound,

    #[error("intersection not found")]
    IntersectionNotFound,

    #[error("corner not found")]
    CornerNotFound,

    #[error("lateral profile not found")]
    ProfileNotFound,

    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}

/// Errors raised while rounding intersection corners.
#[derive(Debug, Error)]
pub enum CornerError {
    #[error(
        "cannot inscribe a corner of radius {radius} at intersection ({}, {}) for corner {corner:?}",
        location.x,
        location.y
    )]
    CannotInscribe {
        radius: f64,
        corner: CornerId,
        intersection: IntersectionId,
        location: Point2,
    },

    #[error("the edges of corner {corner:?} do not intersect")]
    EdgesDoNotIntersect { corner: CornerId },
}

/// Errors related to builder parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {stage} parameters: {fields}")]
    InvalidParameters { stage: &'static str, fields: String },
}

/// Errors related to mesh generation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`RoadMeshError`].
pub type Result<T> = std::result::Result<T, RoadMeshError>;
