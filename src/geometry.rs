//! Pure planar / spherical primitives used by the resolvers.
//!
//! Everything here is stateless and does no I/O. The containment tests use
//! the even-odd (ray casting) rule on raw ring coordinates rather than a
//! full GIS predicate: the boundary datasets we consume are a few hundred
//! hand-digitized administrative polygons, and the ray cast is deterministic
//! even on malformed rings (a wrong but stable answer, never a crash).

use crate::feature::Coord;
use geo_types::{LineString, MultiPolygon, Polygon};

/// IUGG mean Earth radius, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Even-odd test of a point against a single closed ring.
///
/// A ray is cast from the point towards increasing longitude and the ring
/// edge crossings are counted; an odd count means the point is inside.
/// Horizontal edges never satisfy the crossing predicate, so they cannot be
/// double counted. Points exactly on an edge get an arbitrary but stable
/// answer: the same point against the same ring always yields the same result.
pub fn point_in_ring(point: &Coord, ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    if coords.len() < 4 {
        // not a closed ring, nothing can be inside it
        return false;
    }
    let (lon, lat) = (point.x(), point.y());
    let mut inside = false;
    let mut j = coords.len() - 1;
    for i in 0..coords.len() {
        let (xi, yi) = (coords[i].x, coords[i].y);
        let (xj, yj) = (coords[j].x, coords[j].y);
        if (yi > lat) != (yj > lat) {
            let crossing_lon = (xj - xi) * (lat - yi) / (yj - yi) + xi;
            if lon < crossing_lon {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A point is inside a polygon iff it is inside the outer ring
/// and outside every hole.
pub fn point_in_polygon(point: &Coord, polygon: &Polygon<f64>) -> bool {
    point_in_ring(point, polygon.exterior())
        && !polygon
            .interiors()
            .iter()
            .any(|hole| point_in_ring(point, hole))
}

/// Indices of the polygons of `multi` that contain the point.
///
/// Well-formed multipolygons have disjoint members so this returns at most
/// one index, but we do not rely on that.
pub fn point_in_multi_polygon(point: &Coord, multi: &MultiPolygon<f64>) -> Vec<usize> {
    multi
        .0
        .iter()
        .enumerate()
        .filter(|(_, polygon)| point_in_polygon(point, polygon))
        .map(|(i, _)| i)
        .collect()
}

/// Signed planar shoelace area of a ring, in squared degrees.
///
/// This is only meaningful for comparing the relative sizes of rings of the
/// same dataset (the nested-jurisdiction tie break), not as a geodesic area.
pub fn ring_area(ring: &LineString<f64>) -> f64 {
    let coords = &ring.0;
    if coords.len() < 4 {
        return 0.;
    }
    let mut sum = 0.;
    let mut j = coords.len() - 1;
    for i in 0..coords.len() {
        sum += (coords[j].x + coords[i].x) * (coords[j].y - coords[i].y);
        j = i;
    }
    sum / 2.
}

/// Unsigned enclosing area of a polygon: the outer ring minus its holes.
pub fn polygon_area(polygon: &Polygon<f64>) -> f64 {
    let holes: f64 = polygon
        .interiors()
        .iter()
        .map(|hole| ring_area(hole).abs())
        .sum();
    ring_area(polygon.exterior()).abs() - holes
}

/// Great-circle distance between two WGS-84 coordinates, in meters.
///
/// Symmetric in its arguments, and zero iff both points are equal.
pub fn haversine_distance_meters(a: &Coord, b: &Coord) -> f64 {
    let lat_a = a.y().to_radians();
    let lat_b = b.y().to_radians();
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lon = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.).sin().powi(2);
    // h can overshoot 1.0 by a few ulps for antipodal points
    2. * EARTH_RADIUS_METERS * h.sqrt().min(1.).asin()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::{Coordinate, Point};

    fn ring(tuples: Vec<(f64, f64)>) -> LineString<f64> {
        LineString(tuples.into_iter().map(Coordinate::from).collect())
    }

    #[rustfmt::skip]
    fn unit_square() -> LineString<f64> {
        ring(vec![
            (0., 0.),     //  +------+
            (0., 10.),    //  |      |
            (10., 10.),   //  |      |
            (10., 0.),    //  |      |
            (0., 0.),     //  +------+
        ])
    }

    #[test]
    fn ring_inside_outside() {
        let square = unit_square();
        assert!(point_in_ring(&Point::new(5., 5.), &square));
        assert!(point_in_ring(&Point::new(0.1, 9.9), &square));
        assert!(!point_in_ring(&Point::new(-1., 5.), &square));
        assert!(!point_in_ring(&Point::new(5., 11.), &square));
        assert!(!point_in_ring(&Point::new(11., 11.), &square));
    }

    #[test]
    fn ring_edge_point_is_deterministic() {
        let square = unit_square();
        let on_edge = Point::new(0., 5.);
        let first = point_in_ring(&on_edge, &square);
        for _ in 0..10 {
            assert_eq!(point_in_ring(&on_edge, &square), first);
        }
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        let not_closed = ring(vec![(0., 0.), (10., 0.), (5., 5.)]);
        assert!(!point_in_ring(&Point::new(5., 2.), &not_closed));
    }

    #[test]
    fn polygon_hole_exclusion() {
        let outer = unit_square();
        let hole = ring(vec![(4., 4.), (4., 6.), (6., 6.), (6., 4.), (4., 4.)]);
        let polygon = Polygon::new(outer, vec![hole]);

        // inside the outer ring but inside the hole
        assert!(!point_in_polygon(&Point::new(5., 5.), &polygon));
        // inside the outer ring, outside the hole
        assert!(point_in_polygon(&Point::new(2., 2.), &polygon));
    }

    #[test]
    fn multi_polygon_reports_containing_indices() {
        let left = Polygon::new(
            ring(vec![(0., 0.), (0., 1.), (1., 1.), (1., 0.), (0., 0.)]),
            vec![],
        );
        let right = Polygon::new(
            ring(vec![(2., 0.), (2., 1.), (3., 1.), (3., 0.), (2., 0.)]),
            vec![],
        );
        let multi = MultiPolygon(vec![left, right]);

        assert_eq!(point_in_multi_polygon(&Point::new(2.5, 0.5), &multi), vec![1]);
        assert_eq!(point_in_multi_polygon(&Point::new(0.5, 0.5), &multi), vec![0]);
        assert!(point_in_multi_polygon(&Point::new(1.5, 0.5), &multi).is_empty());
    }

    #[test]
    fn shoelace_area() {
        assert_relative_eq!(ring_area(&unit_square()).abs(), 100.);

        let with_hole = Polygon::new(
            unit_square(),
            vec![ring(vec![(4., 4.), (4., 6.), (6., 6.), (6., 4.), (4., 4.)])],
        );
        assert_relative_eq!(polygon_area(&with_hole), 96.);
    }

    #[test]
    fn haversine_symmetry_and_zero() {
        let a = Point::new(77.2090, 28.6139);
        let b = Point::new(77.1909, 28.6519);
        assert_relative_eq!(
            haversine_distance_meters(&a, &b),
            haversine_distance_meters(&b, &a)
        );
        assert_eq!(haversine_distance_meters(&a, &a), 0.);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        // one degree of latitude is ~111.195 km on the mean-radius sphere
        let a = Point::new(77., 28.);
        let b = Point::new(77., 29.);
        assert_relative_eq!(
            haversine_distance_meters(&a, &b),
            111_195.,
            max_relative = 1e-3
        );
    }
}
