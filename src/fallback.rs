//! Nearest-reference fallback, used when containment comes back empty.

use crate::feature::Coord;
use crate::geometry::haversine_distance_meters;

/// A named reference position, typically a police station location.
#[derive(Debug, Clone)]
pub struct ReferencePoint {
    pub id: String,
    pub name: String,
    pub location: Coord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearestMatch {
    /// index of the winning reference in the input slice
    pub index: usize,
    pub distance_meters: f64,
}

/// The closest reference point within `max_distance_meters`, or `None`.
///
/// A minimum farther than the threshold is reported as no match rather than
/// a low-confidence guess. The strict `<` comparison keeps the first of two
/// equidistant references, so the answer is deterministic in input order.
pub fn nearest_within(
    point: &Coord,
    references: &[ReferencePoint],
    max_distance_meters: f64,
) -> Option<NearestMatch> {
    let mut best: Option<NearestMatch> = None;
    for (index, reference) in references.iter().enumerate() {
        let distance_meters = haversine_distance_meters(point, &reference.location);
        if best
            .as_ref()
            .map_or(true, |b| distance_meters < b.distance_meters)
        {
            best = Some(NearestMatch {
                index,
                distance_meters,
            });
        }
    }
    best.filter(|b| b.distance_meters <= max_distance_meters)
}
