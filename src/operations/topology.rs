use std::f64::consts::{PI, TAU};

use crate::error::Result;
use crate::geometry::Pose;
use crate::math::{Vector3, TOLERANCE};
use crate::network::{
    CornerData, IntersectionId, RoadConnection, RoadDirection, RoadNetworkStore,
};

/// Heading in the ground plane of a road leaving the intersection, in
/// `(-π, π]`.
#[must_use]
pub fn departure_heading(samples: &[Pose], direction: RoadDirection) -> f64 {
    let v = match direction {
        RoadDirection::Outgoing => samples.first().map(|p| p.rotation * Vector3::z()),
        RoadDirection::Incoming => samples.last().map(|p| p.rotation * -Vector3::z()),
    }
    .unwrap_or_else(Vector3::z);
    let heading = v.z.atan2(v.x);
    // atan2 gives -π when z is -0.0.
    if heading <= -PI + TOLERANCE {
        heading + TAU
    } else {
        heading
    }
}

/// Connections of an intersection sorted by heading, and the corners between
/// each angularly adjacent pair.
#[derive(Debug, Clone)]
pub struct IntersectionCorners {
    pub intersection: IntersectionId,
    pub connections: Vec<RoadConnection>,
    pub corners: Vec<CornerData>,
}

/// Sorts an intersection's connections counter-clockwise and assigns one
/// corner per adjacent pair.
///
/// Corner `i` has connection `i` as its right road and connection `i + 1`
/// (wrapping) as its left road. Equal headings keep connection order.
#[derive(Debug)]
pub struct IdentifyCorners {
    intersection: IntersectionId,
    radius: f64,
}

impl IdentifyCorners {
    #[must_use]
    pub fn new(intersection: IntersectionId, radius: f64) -> Self {
        Self {
            intersection,
            radius,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the intersection or a connected road is missing.
    pub fn execute(&self, store: &RoadNetworkStore) -> Result<IntersectionCorners> {
        let intersection = store.intersection(self.intersection)?;
        let mut headings = intersection
            .connections
            .iter()
            .enumerate()
            .map(|(order, c)| -> Result<(f64, usize, RoadConnection)> {
                let samples = store.road_samples(c.road)?;
                Ok((departure_heading(samples, c.direction), order, *c))
            })
            .collect::<Result<Vec<_>>>()?;
        headings.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let connections: Vec<RoadConnection> = headings.iter().map(|h| h.2).collect();
        let n = connections.len();
        let corners = (0..n)
            .map(|i| {
                CornerData::new(
                    self.intersection,
                    connections[(i + 1) % n],
                    connections[i],
                    self.radius,
                )
            })
            .collect();

        Ok(IntersectionCorners {
            intersection: self.intersection,
            connections,
            corners,
        })
    }
}
