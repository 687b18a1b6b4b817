use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::{LateralProfileParameters, RoadMarkingParameters};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::{LateralProfile, ProfileSurface, RoadMarking, RoadMaterial, TextureCoordinateStrategy};

/// Incrementally assembles a [`LateralProfile`].
///
/// Pieces are appended from the center outward, one side at a time. Each
/// piece's samples start at a local origin; [`Self::complete`] chains them.
/// [`Self::switch_sides`] mirrors everything added so far onto the left.
#[derive(Debug, Default)]
pub struct LateralProfileBuilder {
    samples: Vec<Point2>,
    surfaces: Vec<ProfileSurface>,
    num_left_surfaces: usize,
    num_left_samples: usize,
}

impl LateralProfileBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push_surface(
        &mut self,
        points: &[Point2],
        material: RoadMaterial,
        tex_strategy: TextureCoordinateStrategy,
        drivable: bool,
    ) {
        self.samples.extend_from_slice(points);
        self.surfaces.push(ProfileSurface::new(
            material,
            tex_strategy,
            drivable,
            points.len(),
        ));
    }

    /// Flat walkway.
    pub fn add_sidewalk(&mut self, width: f64) {
        self.push_surface(
            &[Point2::origin(), Point2::new(width, 0.0)],
            RoadMaterial::Sidewalk,
            TextureCoordinateStrategy::TrackSpace,
            false,
        );
    }

    /// Narrow slot between curb and sidewalk.
    pub fn add_expansion_joint(&mut self, width: f64) {
        self.push_surface(
            &[
                Point2::origin(),
                Point2::new(0.0, -width / 2.0),
                Point2::new(width, -width / 2.0),
                Point2::new(width, 0.0),
            ],
            RoadMaterial::ExpansionJoint,
            TextureCoordinateStrategy::TrackSpace,
            false,
        );
    }

    /// Drivable lane, optionally dropping by `camber` towards its outer edge.
    pub fn add_road(&mut self, width: f64, camber: f64) {
        self.push_surface(
            &[Point2::origin(), Point2::new(width, camber)],
            RoadMaterial::RoadSurface,
            TextureCoordinateStrategy::WorldSpace,
            true,
        );
    }

    pub fn add_gutter(&mut self, width: f64, depth: f64) {
        self.push_surface(
            &[
                Point2::origin(),
                Point2::new(width, -depth),
                Point2::new(width + 0.02, -depth),
            ],
            RoadMaterial::Gutter,
            TextureCoordinateStrategy::TrackSpace,
            false,
        );
    }

    /// Vertical drop closing off the outer edge.
    pub fn add_end_cap(&mut self, height: f64) {
        self.push_surface(
            &[Point2::origin(), Point2::new(0.0, -height)],
            RoadMaterial::Sidewalk,
            TextureCoordinateStrategy::TrackSpace,
            false,
        );
    }

    /// Curb with quarter-circle roundings at its foot and top.
    ///
    /// Both radii are limited to half the curb height.
    #[allow(clippy::cast_precision_loss)]
    pub fn add_curb(
        &mut self,
        height: f64,
        lower_radius: f64,
        upper_radius: f64,
        num_corner_samples: usize,
    ) {
        let lower_radius = lower_radius.min(height / 2.0);
        let upper_radius = upper_radius.min(height / 2.0);
        let n = num_corner_samples.max(1);
        let angle = FRAC_PI_2 / n as f64;
        let angle_offset = 1.5 * PI;

        let mut points = vec![Point2::origin()];
        for i in 1..=n {
            let a = angle_offset + angle * i as f64;
            points.push(Point2::new(a.cos() * lower_radius, (1.0 + a.sin()) * lower_radius));
        }

        let middle = height - (upper_radius + lower_radius);
        if middle > TOLERANCE {
            points.push(Point2::new(lower_radius, lower_radius + middle));
        }

        let offset = Vector2::new(lower_radius, lower_radius + middle);
        for i in 1..=n {
            let a = angle * i as f64;
            points.push(Point2::new(1.0 - a.cos(), a.sin()) * upper_radius + offset);
        }

        self.push_surface(
            &points,
            RoadMaterial::Curb,
            TextureCoordinateStrategy::TrackSpace,
            false,
        );
    }

    /// Mirrors everything added so far onto the left side.
    pub fn switch_sides(&mut self) {
        self.surfaces.reverse();
        self.samples.reverse();
        for s in &mut self.samples {
            s.x = -s.x;
        }
        self.num_left_surfaces = self.surfaces.len();
        self.num_left_samples = self.samples.len();
    }

    /// Chains the pieces outward from the center and records the drivable
    /// span.
    #[must_use]
    pub fn complete(mut self) -> LateralProfile {
        let nl = self.num_left_surfaces;

        // Left side, walking outward from the center.
        let mut offset = Vector2::zeros();
        let mut idx = self.num_left_samples;
        for surface in self.surfaces[..nl].iter().rev() {
            for _ in 0..surface.sample_count {
                idx -= 1;
                self.samples[idx] += offset;
            }
            offset = self.samples[idx].coords;
        }

        let mut offset = Vector2::zeros();
        let mut idx = self.num_left_samples;
        for surface in &self.surfaces[nl..] {
            for _ in 0..surface.sample_count {
                self.samples[idx] += offset;
                idx += 1;
            }
            offset = self.samples[idx - 1].coords;
        }

        let mut start = 0;
        for surface in &mut self.surfaces {
            surface.start_index = start;
            start += surface.sample_count;
        }

        let mut profile = LateralProfile {
            center_index: nl,
            left_drivable_index: nl,
            right_drivable_index: nl,
            ..LateralProfile::default()
        };
        if let Some((i, surface)) = self.surfaces[..nl]
            .iter()
            .enumerate()
            .find(|(_, s)| s.drivable)
        {
            profile.left_drivable_offset = self.samples[surface.start_index];
            profile.left_drivable_index = i;
        }
        if let Some((i, surface)) = self
            .surfaces
            .iter()
            .enumerate()
            .skip(nl)
            .rev()
            .find(|(_, s)| s.drivable)
        {
            profile.right_drivable_offset = self.samples[surface.end_index()];
            profile.right_drivable_index = i;
        }

        profile.samples = self.samples;
        profile.surfaces = self.surfaces;
        profile
    }

    /// Cross-section used for every generated road: `num_lanes` lanes per
    /// side, a shoulder, gutter, curb, expansion joint, sidewalk and end cap,
    /// with lane lines between all lanes.
    #[must_use]
    pub fn standard_road(
        params: &LateralProfileParameters,
        markings: &RoadMarkingParameters,
        num_lanes: usize,
    ) -> LateralProfile {
        let curb_height = params.curb_height.max(params.curb_radius * 1.5);
        let mut builder = Self::new();
        for side in 0..2 {
            for _ in 0..num_lanes {
                builder.add_road(params.lane_width, 0.0);
            }
            builder.add_road(1.0, 0.0);
            builder.add_gutter(params.gutter_width, params.gutter_depth);
            builder.add_curb(curb_height, params.curb_radius / 2.0, params.curb_radius, 5);
            builder.add_expansion_joint(params.expansion_joint_width);
            builder.add_sidewalk(params.sidewalk_width);
            builder.add_end_cap(params.end_cap_height);
            if side == 0 {
                builder.switch_sides();
            }
        }
        let mut profile = builder.complete();

        let solid_white = RoadMarking::solid(RoadMaterial::WhiteLaneLine, markings.line_width);
        let solid_yellow = RoadMarking::solid(RoadMaterial::YellowLaneLine, markings.line_width);
        let dashed_white = RoadMarking::dashed(
            RoadMaterial::WhiteLaneLine,
            markings.line_width,
            markings.dash_length,
            markings.separation_distance,
            markings.beginning_offset,
        );

        let lanes = isize::try_from(num_lanes).unwrap_or(isize::MAX);
        profile.add_road_marking(-lanes, solid_white.clone());
        profile.add_road_marking(0, solid_yellow);
        profile.add_road_marking(lanes, solid_white);
        for i in 1..lanes {
            profile.add_road_marking(i, dashed_white.clone());
            profile.add_road_marking(-i, dashed_white.clone());
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(num_lanes: usize) -> LateralProfile {
        LateralProfileBuilder::standard_road(
            &LateralProfileParameters::default(),
            &RoadMarkingParameters::default(),
            num_lanes,
        )
    }

    #[test]
    fn sides_are_chained_outward() {
        let mut builder = LateralProfileBuilder::new();
        builder.add_road(2.0, 0.0);
        builder.add_sidewalk(1.0);
        builder.switch_sides();
        builder.add_road(3.0, -0.1);
        let profile = builder.complete();

        let xs: Vec<f64> = profile.samples.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![-3.0, -2.0, -2.0, 0.0, 0.0, 3.0]);
        assert!((profile.samples[5].y + 0.1).abs() < TOLERANCE);
        assert_eq!(profile.center_index, 2);
        assert_eq!(profile.surfaces[1].start_index, 2);
        assert_eq!(profile.left_drivable_index, 1);
        assert_eq!(profile.right_drivable_index, 2);
        assert!((profile.left_drivable_offset.x + 2.0).abs() < TOLERANCE);
        assert!((profile.right_drivable_offset.x - 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn curb_reaches_full_height() {
        let mut builder = LateralProfileBuilder::new();
        builder.add_curb(0.3, 0.075, 0.15, 5);
        let profile = builder.complete();
        assert_eq!(profile.surfaces[0].sample_count, 12);
        let top = profile.samples.last().copied().unwrap_or_else(Point2::origin);
        assert!((top.x - 0.225).abs() < TOLERANCE, "top={top:?}");
        assert!((top.y - 0.3).abs() < TOLERANCE, "top={top:?}");
    }

    #[test]
    fn standard_profile_layout() {
        let profile = standard(2);
        assert_eq!(profile.surfaces.len(), 16);
        assert_eq!(profile.markings.len(), 5);
        assert_eq!(profile.center_index, 8);
        assert!((profile.left_drivable_offset.x + 8.0).abs() < TOLERANCE);
        assert!((profile.right_drivable_offset.x - 8.0).abs() < TOLERANCE);

        let center = &profile.markings[1];
        assert_eq!(center.material, RoadMaterial::YellowLaneLine);
        assert_eq!((center.left_surface, center.right_surface), (7, 8));
        assert_eq!(profile.surfaces[7].right_marking, Some(1));
        assert_eq!(profile.surfaces[8].left_marking, Some(1));
        assert!(profile.markings.iter().filter(|m| m.is_dashed()).count() == 2);
    }

    #[test]
    fn drivable_span_is_contiguous_and_monotonic() {
        for lanes in 1..=4 {
            let profile = standard(lanes);
            let drivable: Vec<usize> = profile
                .surfaces
                .iter()
                .enumerate()
                .filter(|(_, s)| s.drivable)
                .map(|(i, _)| i)
                .collect();
            let first = drivable[0];
            let last = drivable[drivable.len() - 1];
            assert_eq!(drivable.len(), last - first + 1, "lanes={lanes}");
            assert_eq!(first, profile.left_drivable_index);
            assert_eq!(last, profile.right_drivable_index);

            for w in profile.samples.windows(2) {
                assert!(w[1].x >= w[0].x - TOLERANCE, "lanes={lanes} {w:?}");
            }
            let left = profile.left_drivable_offset.x;
            let right = profile.right_drivable_offset.x;
            assert!(left < 0.0 && right > 0.0);
            for surface in &profile.surfaces[first..=last] {
                for s in profile.surface_samples(surface) {
                    assert!(s.x >= left - TOLERANCE && s.x <= right + TOLERANCE);
                }
            }
        }
    }

    #[test]
    fn outer_section_starts_at_zero() {
        let profile = standard(1);
        let shoulder = profile.outer_right_section();
        assert_eq!(shoulder.surfaces.len(), 5);
        assert_eq!(shoulder.surfaces[0].material, RoadMaterial::Gutter);
        assert!(shoulder.samples[0].x.abs() < TOLERANCE);
        assert!(shoulder.markings.is_empty());
        assert_eq!(shoulder.surfaces[1].start_index, 3);
    }
}
