pub mod containment;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod feature;
pub mod file_format;
pub mod geometry;
pub mod reconcile;
pub mod store;

pub use crate::engine::{
    JurisdictionEngine, MasterDistrict, MasterStation, ResolutionMethod, ResolutionResult,
    ResolveOptions, StationLocation,
};
pub use crate::error::Error;
pub use crate::feature::{
    coord_from_lat_lon, load_snapshot, BoundaryFeature, BoundarySnapshot, Coord, LoadStats,
};
pub use crate::store::BoundaryStore;
