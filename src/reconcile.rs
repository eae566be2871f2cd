//! Best-effort matching of boundary-dataset labels against the master lists.
//!
//! The boundary datasets and the master data come from different hands, so
//! the names rarely agree byte-for-byte ("PS Connaught Place" vs
//! "Connaught Place"). This layer normalizes both sides and accepts
//! substring containment in either direction. It never fails: no candidate
//! or no match just leaves the corresponding id unset, and the caller falls
//! back to manual selection.

use crate::engine::{MasterDistrict, MasterStation};
use std::collections::BTreeMap;

/// Normalize a label: case-fold, trim, strip one leading prefix token
/// (e.g. "PS "), collapse internal whitespace. Idempotent.
pub fn normalize_name(raw: &str, prefixes: &[String]) -> String {
    let lowered = raw.to_lowercase();
    let mut rest = lowered.trim();
    for prefix in prefixes {
        let prefix = prefix.to_lowercase();
        if let Some(tail) = rest.strip_prefix(prefix.as_str()) {
            // only strip a whole leading token, not "psmith"
            if tail.starts_with(char::is_whitespace) {
                rest = tail.trim_start();
                break;
            }
        }
    }
    rest.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First non-empty value among the ordered candidate property keys.
pub fn extract_label<'a>(
    properties: &'a BTreeMap<String, String>,
    keys: &[String],
) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| properties.get(key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

/// Match a raw station label against the master stations.
///
/// Exact normalized equality is tried over the whole list first, then
/// bidirectional substring containment; within each pass the first master
/// entry wins, so names that are prefixes of each other ("Delhi Cantt" /
/// "Delhi Cantonment") resolve deterministically by master-list order.
pub fn match_station<'a>(
    candidate: &str,
    stations: &'a [MasterStation],
    prefixes: &[String],
) -> Option<&'a MasterStation> {
    let target = normalize_name(candidate, prefixes);
    if target.is_empty() {
        return None;
    }
    stations
        .iter()
        .find(|station| normalize_name(&station.name, prefixes) == target)
        .or_else(|| {
            stations.iter().find(|station| {
                let master = normalize_name(&station.name, prefixes);
                !master.is_empty() && (master.contains(&target) || target.contains(&master))
            })
        })
}

/// Same procedure as [`match_station`], over the master districts.
/// District names carry no station-type prefix, so none is stripped.
pub fn match_district<'a>(
    candidate: &str,
    districts: &'a [MasterDistrict],
) -> Option<&'a MasterDistrict> {
    let target = normalize_name(candidate, &[]);
    if target.is_empty() {
        return None;
    }
    districts
        .iter()
        .find(|district| normalize_name(&district.name, &[]) == target)
        .or_else(|| {
            districts.iter().find(|district| {
                let master = normalize_name(&district.name, &[]);
                !master.is_empty() && (master.contains(&target) || target.contains(&master))
            })
        })
}
