use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Multiplier used to derive per-item seeds from a base seed.
const SEED_MULTIPLIER: u32 = 0x202A_96CF;

/// Intersection corner rounding and contour sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionParameters {
    /// Radius of the arc inscribed at every corner.
    pub corner_radius: f64,
    /// Contour grid size as `(radial rows, samples per row)`. The second
    /// component must be odd so each grid has a center column.
    pub num_samples: (usize, usize),
    /// Arc and outline sampling density.
    pub samples_per_meter: f64,
}

impl Default for IntersectionParameters {
    fn default() -> Self {
        Self {
            corner_radius: 4.5,
            num_samples: (7, 21),
            samples_per_meter: 2.0,
        }
    }
}

/// Lane line dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadMarkingParameters {
    pub line_width: f64,
    pub dash_length: f64,
    pub separation_distance: f64,
    pub beginning_offset: f64,
}

impl Default for RoadMarkingParameters {
    fn default() -> Self {
        Self {
            line_width: 0.1524,
            dash_length: 3.0,
            separation_distance: 9.144,
            beginning_offset: 0.0,
        }
    }
}

/// Cross-section dimensions of every generated road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LateralProfileParameters {
    pub random_seed: u32,
    /// Draw the lane count of each street uniformly from `1..=num_lanes`.
    pub random_num_lanes: bool,
    /// Lanes per side.
    pub num_lanes: usize,
    pub lane_width: f64,
    pub gutter_width: f64,
    pub gutter_depth: f64,
    pub curb_height: f64,
    pub curb_radius: f64,
    pub sidewalk_width: f64,
    pub expansion_joint_width: f64,
    pub end_cap_height: f64,
}

impl Default for LateralProfileParameters {
    fn default() -> Self {
        Self {
            random_seed: 0,
            random_num_lanes: false,
            num_lanes: 2,
            lane_width: 3.5,
            gutter_width: 0.1,
            gutter_depth: 0.05,
            curb_height: 0.3,
            curb_radius: 0.15,
            sidewalk_width: 1.0,
            expansion_joint_width: 0.0075,
            end_cap_height: 1.0,
        }
    }
}

/// Placement and camera path generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathParameters {
    pub generate_placement_paths: bool,
    pub generate_camera_path: bool,
    /// Distance kept between the camera path and the curb.
    pub offset_from_curb: f64,
    /// Upper bound on road-to-road steps of a single edge walk.
    pub max_traversal_steps: usize,
}

impl Default for PathParameters {
    fn default() -> Self {
        Self {
            generate_placement_paths: true,
            generate_camera_path: true,
            offset_from_curb: 1.5,
            max_traversal_steps: 1000,
        }
    }
}

/// All parameters consumed by [`crate::RoadBuilder`].
///
/// Missing fields deserialize to their defaults, so a partial or empty
/// document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadBuilderParameters {
    pub base_random_seed: u32,
    pub intersection: IntersectionParameters,
    pub markings: RoadMarkingParameters,
    pub profile: LateralProfileParameters,
    pub paths: PathParameters,
}

pub(crate) fn clamp_min<T: PartialOrd + Copy + std::fmt::Debug>(field: &'static str, value: &mut T, min: T) {
    if *value < min {
        warn!(field, value = ?*value, min = ?min, "parameter below minimum, clamping");
        *value = min;
    }
}

impl RoadBuilderParameters {
    /// Returns a copy with every below-minimum value clamped.
    ///
    /// Each clamped field is logged once.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut p = self.clone();

        let intersection = &mut p.intersection;
        clamp_min("intersection.corner_radius", &mut intersection.corner_radius, 0.1);
        clamp_min("intersection.num_samples.0", &mut intersection.num_samples.0, 2);
        clamp_min("intersection.num_samples.1", &mut intersection.num_samples.1, 3);
        if intersection.num_samples.1 % 2 == 0 {
            warn!(
                value = intersection.num_samples.1,
                "intersection.num_samples.1 must be odd, incrementing"
            );
            intersection.num_samples.1 += 1;
        }
        clamp_min("intersection.samples_per_meter", &mut intersection.samples_per_meter, 1.0);
        if intersection.samples_per_meter > 5.0 {
            warn!(
                value = intersection.samples_per_meter,
                max = 5.0,
                "parameter above maximum, clamping"
            );
            intersection.samples_per_meter = 5.0;
        }

        let markings = &mut p.markings;
        clamp_min("markings.line_width", &mut markings.line_width, 0.01);
        clamp_min("markings.dash_length", &mut markings.dash_length, 0.1);
        clamp_min("markings.separation_distance", &mut markings.separation_distance, 0.1);

        let profile = &mut p.profile;
        clamp_min("profile.num_lanes", &mut profile.num_lanes, 1);
        clamp_min("profile.lane_width", &mut profile.lane_width, 0.1);

        p
    }

    /// Checks the path parameters, listing every invalid field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameters`] naming all offending fields.
    pub fn validate_paths(&self) -> Result<(), ConfigError> {
        let mut invalid = Vec::new();
        if !self.paths.offset_from_curb.is_finite() {
            invalid.push("paths.offset_from_curb");
        }
        if self.paths.max_traversal_steps == 0 {
            invalid.push("paths.max_traversal_steps");
        }
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::InvalidParameters {
                stage: "path",
                fields: invalid.join(", "),
            })
        }
    }

    /// Seed for the lateral profile stage.
    #[must_use]
    pub fn profile_seed(&self) -> u32 {
        combine_seed_with_base_seed(self.base_random_seed, self.profile.random_seed)
    }
}

/// `base XOR local`.
#[must_use]
pub fn combine_seed_with_base_seed(base: u32, local: u32) -> u32 {
    base ^ local
}

/// Deterministic seed for the `index`-th item of a parallel stage.
#[must_use]
pub fn parallel_seed(base: u32, index: u32) -> u64 {
    u64::from(
        base.wrapping_add(1)
            .wrapping_mul(index.wrapping_add(1))
            .wrapping_mul(SEED_MULTIPLIER),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let params: RoadBuilderParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(params, RoadBuilderParameters::default());
        assert_eq!(params.intersection.num_samples, (7, 21));
        assert!((params.paths.offset_from_curb - 1.5).abs() < 1e-12);
    }

    #[test]
    fn partial_document_fills_missing_fields() {
        let params: RoadBuilderParameters =
            serde_json::from_str(r#"{"profile": {"num_lanes": 3}, "base_random_seed": 7}"#).unwrap();
        assert_eq!(params.profile.num_lanes, 3);
        assert!((params.profile.lane_width - 3.5).abs() < 1e-12);
        assert_eq!(params.base_random_seed, 7);
    }

    #[test]
    fn sanitize_clamps_small_values() {
        let mut params = RoadBuilderParameters::default();
        params.intersection.corner_radius = 0.0;
        params.intersection.num_samples = (1, 10);
        params.intersection.samples_per_meter = 10.0;
        params.profile.num_lanes = 0;
        let clean = params.sanitized();
        assert!((clean.intersection.corner_radius - 0.1).abs() < 1e-12);
        assert_eq!(clean.intersection.num_samples, (2, 11));
        assert!((clean.intersection.samples_per_meter - 5.0).abs() < 1e-12);
        assert_eq!(clean.profile.num_lanes, 1);
    }

    #[test]
    fn invalid_path_fields_are_reported_together() {
        let mut params = RoadBuilderParameters::default();
        params.paths.offset_from_curb = f64::NAN;
        params.paths.max_traversal_steps = 0;
        let err = params.validate_paths().unwrap_err().to_string();
        assert!(err.contains("paths.offset_from_curb"), "{err}");
        assert!(err.contains("paths.max_traversal_steps"), "{err}");
    }

    #[test]
    fn seeds() {
        assert_eq!(combine_seed_with_base_seed(0b1100, 0b1010), 0b0110);
        assert_ne!(parallel_seed(3, 0), parallel_seed(3, 1));
        assert_eq!(parallel_seed(0, 0), u64::from(SEED_MULTIPLIER));
    }
}
