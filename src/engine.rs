//! The jurisdiction resolution engine: one call from a GPS coordinate to a
//! canonical police station / district pair.

use crate::containment::find_containing;
use crate::error::Error;
use crate::fallback::{nearest_within, ReferencePoint};
use crate::feature::{coord_from_lat_lon, BoundaryFeature, Coord};
use crate::reconcile::{extract_label, match_district, match_station};
use crate::store::BoundaryStore;
use log::{debug, info};
use serde_derive::*;

/// A master police station record, supplied fresh by the caller on every
/// resolution (master data is owned by the CRUD layer, not by the engine).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MasterStation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub district_id: Option<String>,
    /// station position; stations with one double as fallback references
    #[serde(default)]
    pub location: Option<StationLocation>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct StationLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl StationLocation {
    pub fn to_coord(self) -> Coord {
        Coord::new(self.longitude, self.latitude)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MasterDistrict {
    pub id: String,
    pub name: String,
}

/// How the result was obtained.
#[derive(Serialize, Deserialize, Copy, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// the coordinate fell inside a boundary polygon
    Contained,
    /// no polygon contained it, a station within the distance threshold won
    NearestFallback,
    /// nothing matched; the caller should offer manual selection
    Unresolved,
}

/// The outcome of one resolution call. `method` is always set; the ids are
/// present only when the corresponding stage found a match.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResolutionResult {
    pub station_id: Option<String>,
    pub district_id: Option<String>,
    pub method: ResolutionMethod,
    pub distance_meters: Option<f64>,
    pub matched_feature_id: Option<String>,
    /// the raw label that matched, for display ("Jurisdiction: PS Dwarka")
    pub matched_label: Option<String>,
}

impl ResolutionResult {
    fn unresolved() -> Self {
        ResolutionResult {
            station_id: None,
            district_id: None,
            method: ResolutionMethod::Unresolved,
            distance_meters: None,
            matched_feature_id: None,
            matched_label: None,
        }
    }
}

/// The engine's configuration surface.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ResolveOptions {
    /// beyond this distance the fallback reports `Unresolved` instead of a guess
    pub max_fallback_distance_meters: f64,
    /// ordered property keys tried for the station label
    pub station_keys: Vec<String>,
    /// ordered property keys tried for the district label
    pub district_keys: Vec<String>,
    /// station-type prefixes stripped during normalization
    pub station_prefixes: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        // key and prefix defaults match the police-station boundary datasets
        // this engine was built against
        ResolveOptions {
            max_fallback_distance_meters: 15_000.,
            station_keys: vec![
                "POL_STN_NM".into(),
                "NAME".into(),
                "Name".into(),
                "name".into(),
            ],
            district_keys: vec!["DIST_NM".into(), "DISTRICT".into(), "District".into()],
            station_prefixes: vec!["PS".into()],
        }
    }
}

/// Composes the boundary store, the resolvers and the reconciliation layer.
///
/// `resolve` is a pure read: it never mutates its inputs and is safe to call
/// concurrently with itself and with store refreshes.
pub struct JurisdictionEngine {
    store: BoundaryStore,
    options: ResolveOptions,
}

impl JurisdictionEngine {
    pub fn new(store: BoundaryStore, options: ResolveOptions) -> Self {
        JurisdictionEngine { store, options }
    }

    pub fn store(&self) -> &BoundaryStore {
        &self.store
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve the jurisdiction owning `(latitude, longitude)`.
    ///
    /// Containment against the current boundary snapshot is tried first;
    /// when it comes back empty, the nearest master station within the
    /// configured threshold is used instead. Absence of any match is a
    /// valid `Unresolved` result, not an error.
    pub fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
        stations: &[MasterStation],
        districts: &[MasterDistrict],
    ) -> Result<ResolutionResult, Error> {
        let point = coord_from_lat_lon(latitude, longitude)?;
        let snapshot = self.store.current()?;

        let contained = find_containing(&point, &snapshot);
        if let Some(winner) = contained.first() {
            debug!(
                "({}, {}) contained by feature {} ({} candidate(s))",
                latitude,
                longitude,
                winner.feature.id,
                contained.len()
            );
            return Ok(self.reconcile_feature(winner.feature, stations, districts));
        }

        let references: Vec<ReferencePoint> = stations
            .iter()
            .filter_map(|station| {
                station.location.map(|location| ReferencePoint {
                    id: station.id.clone(),
                    name: station.name.clone(),
                    location: location.to_coord(),
                })
            })
            .collect();

        match nearest_within(&point, &references, self.options.max_fallback_distance_meters) {
            Some(nearest) => {
                let reference = &references[nearest.index];
                info!(
                    "({}, {}) outside all boundaries, nearest station {} at {:.0} m",
                    latitude, longitude, reference.name, nearest.distance_meters
                );
                let station =
                    match_station(&reference.name, stations, &self.options.station_prefixes);
                Ok(ResolutionResult {
                    station_id: station.map(|s| s.id.clone()),
                    district_id: station.and_then(|s| s.district_id.clone()),
                    method: ResolutionMethod::NearestFallback,
                    distance_meters: Some(nearest.distance_meters),
                    matched_feature_id: None,
                    matched_label: Some(reference.name.clone()),
                })
            }
            None => {
                info!(
                    "({}, {}) outside all boundaries and no station within {} m",
                    latitude, longitude, self.options.max_fallback_distance_meters
                );
                Ok(ResolutionResult::unresolved())
            }
        }
    }

    // map the winning feature's property bag to master ids; the station's
    // own district is authoritative when it has one
    fn reconcile_feature(
        &self,
        feature: &BoundaryFeature,
        stations: &[MasterStation],
        districts: &[MasterDistrict],
    ) -> ResolutionResult {
        let label = extract_label(&feature.properties, &self.options.station_keys);
        let station = label
            .and_then(|label| match_station(label, stations, &self.options.station_prefixes));

        let district_id = station
            .and_then(|station| station.district_id.clone())
            .or_else(|| {
                extract_label(&feature.properties, &self.options.district_keys)
                    .and_then(|label| match_district(label, districts))
                    .map(|district| district.id.clone())
            });

        ResolutionResult {
            station_id: station.map(|station| station.id.clone()),
            district_id,
            method: ResolutionMethod::Contained,
            distance_meters: None,
            matched_feature_id: Some(feature.id.clone()),
            matched_label: label.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_options_cover_the_known_dataset_keys() {
        let options = ResolveOptions::default();
        assert_eq!(options.max_fallback_distance_meters, 15_000.);
        assert_eq!(options.station_keys[0], "POL_STN_NM");
        assert_eq!(options.district_keys[0], "DIST_NM");
        assert_eq!(options.station_prefixes, vec!["PS".to_string()]);
    }

    #[test]
    fn options_deserialize_with_partial_overrides() {
        let options: ResolveOptions =
            serde_json::from_str(r#"{ "max_fallback_distance_meters": 5000.0 }"#).unwrap();
        assert_eq!(options.max_fallback_distance_meters, 5_000.);
        // unspecified fields keep their defaults
        assert_eq!(options.station_keys[0], "POL_STN_NM");
    }

    #[test]
    fn method_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ResolutionMethod::NearestFallback).unwrap(),
            "\"nearest_fallback\""
        );
    }
}
