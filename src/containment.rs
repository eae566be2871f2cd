//! Exact containment pass over a boundary snapshot.

use crate::feature::{BoundaryFeature, BoundarySnapshot, Coord};
use crate::geometry::{point_in_multi_polygon, polygon_area};
use std::cmp::Ordering;

/// A feature containing the probed point, with the planar area of the
/// smallest of its polygons that encloses it.
pub struct ContainedFeature<'a> {
    pub feature: &'a BoundaryFeature,
    pub area: f64,
}

/// All features of the snapshot containing the point, most specific first.
///
/// Overlapping or nested jurisdictions do happen in hand-digitized boundary
/// data, so the result is ordered by enclosing area ascending; features with
/// equal areas keep their snapshot order (the sort is stable), which makes
/// the winner reproducible across calls. An empty result simply means the
/// point is outside every mapped boundary.
pub fn find_containing<'a>(
    point: &Coord,
    snapshot: &'a BoundarySnapshot,
) -> Vec<ContainedFeature<'a>> {
    let mut contained: Vec<ContainedFeature<'_>> = snapshot
        .features
        .iter()
        .filter(|feature| in_bbox(point, feature))
        .filter_map(|feature| {
            let polygons = point_in_multi_polygon(point, &feature.geometry);
            let area = polygons
                .iter()
                .map(|&i| polygon_area(&feature.geometry.0[i]))
                .fold(None, |min: Option<f64>, area| {
                    Some(min.map_or(area, |m| m.min(area)))
                })?;
            Some(ContainedFeature { feature, area })
        })
        .collect();

    contained.sort_by(|a, b| a.area.partial_cmp(&b.area).unwrap_or(Ordering::Equal));
    contained
}

// bbox miss means the exact test cannot hit; features without a bbox are
// always tested exactly
fn in_bbox(point: &Coord, feature: &BoundaryFeature) -> bool {
    match feature.bbox {
        Some(bbox) => {
            point.x() >= bbox.min().x
                && point.x() <= bbox.max().x
                && point.y() >= bbox.min().y
                && point.y() <= bbox.max().y
        }
        None => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::feature::LoadStats;
    use geo::bounding_rect::BoundingRect;
    use geo_types::{Coordinate, LineString, MultiPolygon, Point, Polygon};
    use std::collections::BTreeMap;

    fn feature(id: &str, ls: LineString<f64>) -> BoundaryFeature {
        let geometry = MultiPolygon(vec![Polygon::new(ls, vec![])]);
        BoundaryFeature {
            id: id.into(),
            bbox: geometry.bounding_rect(),
            geometry,
            properties: BTreeMap::new(),
        }
    }

    fn ring(tuples: Vec<(f64, f64)>) -> LineString<f64> {
        LineString(tuples.into_iter().map(Coordinate::from).collect())
    }

    fn snapshot(features: Vec<BoundaryFeature>) -> BoundarySnapshot {
        BoundarySnapshot {
            version: 1,
            features,
            stats: LoadStats::default(),
        }
    }

    #[rustfmt::skip]
    fn nested_features() -> Vec<BoundaryFeature> {
        let outer = ring(vec![
            (0., 0.),     //  +--------+
            (0., 10.),    //  | outer  |
            (10., 10.),   //  |        |
            (10., 0.),    //  |        |
            (0., 0.),     //  +--------+
        ]);
        let inner = ring(vec![
            (2., 2.),     //  +--------+
            (2., 8.),     //  | +----+ |
            (8., 8.),     //  | |in. | |
            (8., 2.),     //  | +----+ |
            (2., 2.),     //  +--------+
        ]);
        vec![feature("outer", outer), feature("inner", inner)]
    }

    #[test]
    fn nested_boundaries_resolve_to_the_smallest() {
        let snapshot = snapshot(nested_features());
        let contained = find_containing(&Point::new(5., 5.), &snapshot);

        assert_eq!(contained.len(), 2);
        // most specific boundary wins
        assert_eq!(contained[0].feature.id, "inner");
        assert_eq!(contained[1].feature.id, "outer");
        assert!(contained[0].area < contained[1].area);
    }

    #[test]
    fn equal_areas_keep_snapshot_order() {
        // two identical overlapping boundaries
        let square = || ring(vec![(0., 0.), (0., 4.), (4., 4.), (4., 0.), (0., 0.)]);
        let snapshot = snapshot(vec![feature("first", square()), feature("second", square())]);

        let contained = find_containing(&Point::new(2., 2.), &snapshot);
        assert_eq!(contained.len(), 2);
        assert_eq!(contained[0].feature.id, "first");
    }

    #[test]
    fn outside_everything_is_empty_not_an_error() {
        let snapshot = snapshot(nested_features());
        assert!(find_containing(&Point::new(50., 50.), &snapshot).is_empty());
    }

    #[test]
    fn hole_is_not_contained() {
        let outer = ring(vec![(0., 0.), (0., 10.), (10., 10.), (10., 0.), (0., 0.)]);
        let hole = ring(vec![(4., 4.), (4., 6.), (6., 6.), (6., 4.), (4., 4.)]);
        let geometry = MultiPolygon(vec![Polygon::new(outer, vec![hole])]);
        let snapshot = snapshot(vec![BoundaryFeature {
            id: "donut".into(),
            bbox: geometry.bounding_rect(),
            geometry,
            properties: BTreeMap::new(),
        }]);

        assert!(find_containing(&Point::new(5., 5.), &snapshot).is_empty());
        assert_eq!(find_containing(&Point::new(1., 1.), &snapshot).len(), 1);
    }
}
