mod builder;

pub use builder::LateralProfileBuilder;

use serde::{Deserialize, Serialize};

use crate::config::clamp_min;
use crate::math::Point2;

/// Material of a generated surface. Ids are stable and used to group the
/// assembled mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoadMaterial {
    RoadSurface,
    Gutter,
    Curb,
    Sidewalk,
    ExpansionJoint,
    YellowLaneLine,
    WhiteLaneLine,
}

impl RoadMaterial {
    /// Every material in id order.
    pub const ALL: [RoadMaterial; 7] = [
        RoadMaterial::RoadSurface,
        RoadMaterial::Gutter,
        RoadMaterial::Curb,
        RoadMaterial::Sidewalk,
        RoadMaterial::ExpansionJoint,
        RoadMaterial::YellowLaneLine,
        RoadMaterial::WhiteLaneLine,
    ];

    /// Stable numeric id.
    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            RoadMaterial::RoadSurface => 0,
            RoadMaterial::Gutter => 1,
            RoadMaterial::Curb => 2,
            RoadMaterial::Sidewalk => 3,
            RoadMaterial::ExpansionJoint => 4,
            RoadMaterial::YellowLaneLine => 5,
            RoadMaterial::WhiteLaneLine => 6,
        }
    }

    /// Human readable label for mesh naming.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RoadMaterial::RoadSurface => "RoadSurface",
            RoadMaterial::Gutter => "Gutter",
            RoadMaterial::Curb => "Curb",
            RoadMaterial::Sidewalk => "Sidewalk",
            RoadMaterial::ExpansionJoint => "ExpansionJoint",
            RoadMaterial::YellowLaneLine => "YellowLaneLine",
            RoadMaterial::WhiteLaneLine => "WhiteLaneLine",
        }
    }
}

/// How a surface's texture coordinates are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureCoordinateStrategy {
    /// `uv = (x, z)` of each vertex.
    WorldSpace,
    /// `u` follows the cross-section, `v` the distance along the road.
    TrackSpace,
}

/// A contiguous span of profile samples sharing one material.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSurface {
    pub material: RoadMaterial,
    pub tex_strategy: TextureCoordinateStrategy,
    pub drivable: bool,
    pub start_index: usize,
    pub sample_count: usize,
    /// Index into [`LateralProfile::markings`].
    pub left_marking: Option<usize>,
    pub right_marking: Option<usize>,
}

impl ProfileSurface {
    pub(crate) fn new(
        material: RoadMaterial,
        tex_strategy: TextureCoordinateStrategy,
        drivable: bool,
        sample_count: usize,
    ) -> Self {
        Self {
            material,
            tex_strategy,
            drivable,
            start_index: 0,
            sample_count,
            left_marking: None,
            right_marking: None,
        }
    }

    /// Index of the surface's last sample.
    #[must_use]
    pub fn end_index(&self) -> usize {
        self.start_index + self.sample_count - 1
    }
}

/// A painted line on the boundary between two surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMarking {
    pub material: RoadMaterial,
    pub width: f64,
    pub dash_length: f64,
    pub separation_distance: f64,
    pub beginning_offset: f64,
    pub left_surface: usize,
    pub right_surface: usize,
}

impl RoadMarking {
    /// A continuous line. A negative width is clamped to zero.
    #[must_use]
    pub fn solid(material: RoadMaterial, mut width: f64) -> Self {
        clamp_min("marking.width", &mut width, 0.0);
        Self {
            material,
            width,
            dash_length: 0.0,
            separation_distance: 0.0,
            beginning_offset: 0.0,
            left_surface: 0,
            right_surface: 0,
        }
    }

    /// A dashed line. Negative lengths are clamped to zero, and a line without
    /// separation is drawn solid.
    #[must_use]
    pub fn dashed(
        material: RoadMaterial,
        mut width: f64,
        mut dash_length: f64,
        mut separation_distance: f64,
        beginning_offset: f64,
    ) -> Self {
        clamp_min("marking.width", &mut width, 0.0);
        clamp_min("marking.dash_length", &mut dash_length, 0.0);
        clamp_min("marking.separation_distance", &mut separation_distance, 0.0);
        Self {
            material,
            width,
            dash_length,
            separation_distance,
            beginning_offset,
            left_surface: 0,
            right_surface: 0,
        }
    }

    #[must_use]
    pub fn is_dashed(&self) -> bool {
        self.separation_distance > 0.0
    }
}

/// Cross-section of a road, ordered left to right.
///
/// Samples are `(lateral offset, elevation)`; lateral offsets grow to the
/// right of the direction of travel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LateralProfile {
    pub samples: Vec<Point2>,
    pub surfaces: Vec<ProfileSurface>,
    pub markings: Vec<RoadMarking>,
    /// Outer-left sample of the drivable span.
    pub left_drivable_offset: Point2,
    /// Outer-right sample of the drivable span.
    pub right_drivable_offset: Point2,
    /// Index of the first surface right of the center line.
    pub center_index: usize,
    pub left_drivable_index: usize,
    pub right_drivable_index: usize,
}

impl LateralProfile {
    /// Samples belonging to `surface`.
    #[must_use]
    pub fn surface_samples(&self, surface: &ProfileSurface) -> &[Point2] {
        &self.samples[surface.start_index..surface.start_index + surface.sample_count]
    }

    /// Marks the boundary left of lane `lane` (relative to the center line,
    /// negative to the left) with `marking`.
    pub fn add_road_marking(&mut self, lane: isize, mut marking: RoadMarking) {
        let Some(left) = self.center_index.checked_add_signed(lane - 1) else {
            return;
        };
        if left + 1 >= self.surfaces.len() {
            return;
        }
        let index = self.markings.len();
        marking.left_surface = left;
        marking.right_surface = left + 1;
        self.markings.push(marking);
        self.surfaces[left].right_marking = Some(index);
        self.surfaces[left + 1].left_marking = Some(index);
    }

    /// Copy of the part right of the drivable span, re-based so its first
    /// sample sits at lateral offset zero. Used for corner shoulders.
    #[must_use]
    pub fn outer_right_section(&self) -> LateralProfile {
        let first = self.right_drivable_index + 1;
        let Some(first_surface) = self.surfaces.get(first) else {
            return LateralProfile::default();
        };
        let start = first_surface.start_index;
        let base = self.samples[start].x;
        let samples: Vec<Point2> = self.samples[start..]
            .iter()
            .map(|s| Point2::new(s.x - base, s.y))
            .collect();

        let mut next_start = 0;
        let surfaces = self.surfaces[first..]
            .iter()
            .map(|s| {
                let mut surface = s.clone();
                surface.start_index = next_start;
                surface.left_marking = None;
                surface.right_marking = None;
                next_start += surface.sample_count;
                surface
            })
            .collect();

        LateralProfile {
            samples,
            surfaces,
            ..LateralProfile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_marking_lengths_are_clamped() {
        let marking = RoadMarking::dashed(RoadMaterial::WhiteLaneLine, -0.2, -3.0, -9.0, 1.0);
        assert!(marking.width.abs() < 1e-12);
        assert!(marking.dash_length.abs() < 1e-12);
        assert!(marking.separation_distance.abs() < 1e-12);
        assert!(!marking.is_dashed());

        let marking = RoadMarking::dashed(RoadMaterial::WhiteLaneLine, 0.2, 3.0, -9.0, 1.0);
        assert!((marking.dash_length - 3.0).abs() < 1e-12);
        assert!(!marking.is_dashed());

        let solid = RoadMarking::solid(RoadMaterial::YellowLaneLine, -1.0);
        assert!(solid.width.abs() < 1e-12);
    }

    #[test]
    fn valid_marking_lengths_are_kept() {
        let marking = RoadMarking::dashed(RoadMaterial::WhiteLaneLine, 0.15, 3.0, 9.0, -2.0);
        assert!((marking.width - 0.15).abs() < 1e-12);
        assert!((marking.separation_distance - 9.0).abs() < 1e-12);
        assert!((marking.beginning_offset + 2.0).abs() < 1e-12);
        assert!(marking.is_dashed());
    }
}
