//! Boundary data model: features, snapshots and the GeoJSON loader.

use crate::error::Error;
use failure::format_err;
use geo::bounding_rect::BoundingRect;
use geo_types::{Geometry, MultiPolygon, Point, Rect};
use log::warn;
use serde_derive::*;
use std::collections::BTreeMap;
use std::convert::TryInto;

/// A WGS-84 position; x is the longitude, y the latitude.
pub type Coord = Point<f64>;

/// Validate latitude/longitude ranges and build a [`Coord`] from them.
///
/// Out-of-range (or non-finite) values are rejected before any geometry work.
pub fn coord_from_lat_lon(latitude: f64, longitude: f64) -> Result<Coord, Error> {
    if !(-90. ..=90.).contains(&latitude) || !(-180. ..=180.).contains(&longitude) {
        return Err(Error::InvalidCoordinate {
            latitude,
            longitude,
        });
    }
    Ok(Point::new(longitude, latitude))
}

/// One administrative boundary, immutable after load.
///
/// Polygon geometries from the source dataset are normalized to
/// single-member multipolygons so the resolvers have only one case to
/// handle. The properties bag keeps the dataset's keys as-is: the datasets
/// we consume are not consistent about key naming (`POL_STN_NM`, `NAME`,
/// ...), so key selection is deferred to the reconciliation layer.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub id: String,
    pub geometry: MultiPolygon<f64>,
    /// bounding box, used as a cheap prefilter before the exact test
    pub bbox: Option<Rect<f64>>,
    pub properties: BTreeMap<String, String>,
}

/// Per-load report: how many features were read, how many were dropped and why.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoadStats {
    pub read: usize,
    pub skipped: usize,
    pub warnings: Vec<String>,
}

impl LoadStats {
    fn skip(&mut self, warning: String) {
        warn!("{}", warning);
        self.skipped += 1;
        self.warnings.push(warning);
    }
}

/// An immutable, versioned view of the whole boundary dataset.
///
/// Snapshots are built atomically by [`load_snapshot`] and shared as
/// `Arc<BoundarySnapshot>`: a resolution call keeps working against the
/// snapshot it captured even if the store swaps in a newer one mid-call.
#[derive(Debug, Clone)]
pub struct BoundarySnapshot {
    pub version: u64,
    pub features: Vec<BoundaryFeature>,
    pub stats: LoadStats,
}

impl BoundarySnapshot {
    /// Weak ETag for the snapshot, usable as-is in an HTTP header.
    pub fn etag(&self) -> String {
        format!("W/\"boundaries-v{}\"", self.version)
    }
}

/// Read a GeoJSON FeatureCollection into a snapshot.
///
/// A feature with a missing, non-areal or degenerate geometry is skipped
/// with a warning recorded in the stats; only an unparseable collection
/// fails the whole load.
pub fn load_snapshot(
    reader: impl std::io::Read,
    version: u64,
) -> Result<BoundarySnapshot, failure::Error> {
    let geojson: geojson::GeoJson = serde_json::from_reader(reader)?;
    let collection = match geojson {
        geojson::GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(format_err!("boundary source is not a FeatureCollection")),
    };

    let mut stats = LoadStats::default();
    let mut features = Vec::with_capacity(collection.features.len());

    for (position, feature) in collection.features.into_iter().enumerate() {
        let id = feature_id(&feature, position);

        let geometry = match feature.geometry {
            Some(g) => g,
            None => {
                stats.skip(format!("feature {}: no geometry, skipped", id));
                continue;
            }
        };
        let geometry: Result<Geometry<f64>, _> = geometry.value.try_into();
        let multi = match geometry {
            Ok(Geometry::MultiPolygon(multi)) => multi,
            Ok(Geometry::Polygon(polygon)) => MultiPolygon(vec![polygon]),
            Ok(_) => {
                stats.skip(format!("feature {}: geometry is not areal, skipped", id));
                continue;
            }
            Err(e) => {
                stats.skip(format!("feature {}: invalid geometry ({}), skipped", id, e));
                continue;
            }
        };
        if multi.0.is_empty() || multi.0.iter().any(|p| p.exterior().0.len() < 4) {
            stats.skip(format!("feature {}: degenerate ring, skipped", id));
            continue;
        }

        let bbox = multi.bounding_rect();
        features.push(BoundaryFeature {
            id,
            bbox,
            properties: feature.properties.map(string_properties).unwrap_or_default(),
            geometry: multi,
        });
        stats.read += 1;
    }

    Ok(BoundarySnapshot {
        version,
        features,
        stats,
    })
}

/// Stable feature key: the GeoJSON id when there is one,
/// else the position in the collection.
fn feature_id(feature: &geojson::Feature, position: usize) -> String {
    match &feature.id {
        Some(geojson::feature::Id::String(s)) => s.clone(),
        Some(geojson::feature::Id::Number(n)) => n.to_string(),
        None => format!("feature:{}", position),
    }
}

// the properties bag is string -> string; scalar json values are
// stringified, nested values are dropped
fn string_properties(
    properties: serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<String, String> {
    use serde_json::Value;
    properties
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k, s)),
            Value::Number(n) => Some((k, n.to_string())),
            Value::Bool(b) => Some((k, b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        })
        .collect()
}
