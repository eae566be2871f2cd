//! Process-wide cache of the boundary dataset with an explicit
//! load / current / refresh lifecycle.

use crate::error::Error;
use crate::feature::{load_snapshot, BoundarySnapshot};
use crate::file_format::InputFormat;
use failure::ResultExt;
use log::{info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

struct StoreState {
    snapshot: Option<Arc<BoundarySnapshot>>,
    next_version: u64,
}

/// Owns the current [`BoundarySnapshot`] and swaps it atomically on refresh.
///
/// Reads only clone the `Arc`, so resolutions running in other threads keep
/// the snapshot they captured; a single writer publishes replacements
/// wholesale. A failed refresh leaves the last good snapshot in place.
pub struct BoundaryStore {
    path: PathBuf,
    format: InputFormat,
    state: RwLock<StoreState>,
}

impl BoundaryStore {
    /// Build a store reading from a GeoJSON file
    /// (`.json`, `.geojson`, optionally `.gz`). Nothing is loaded yet.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, failure::Error> {
        let path = path.into();
        let format = InputFormat::from_filename(&path)?;
        Ok(BoundaryStore {
            path,
            format,
            state: RwLock::new(StoreState {
                snapshot: None,
                next_version: 1,
            }),
        })
    }

    fn load(&self, version: u64) -> Result<BoundarySnapshot, failure::Error> {
        let file = File::open(&self.path)
            .with_context(|_| format!("cannot open boundary source {}", self.path.display()))?;
        let reader = BufReader::new(file);
        let snapshot = match self.format {
            InputFormat::Json => load_snapshot(reader, version)?,
            InputFormat::JsonGz => {
                let gz = flate2::bufread::GzDecoder::new(reader);
                load_snapshot(BufReader::new(gz), version)?
            }
        };
        info!(
            "loaded boundary snapshot v{} from {}: {} features, {} skipped",
            snapshot.version,
            self.path.display(),
            snapshot.stats.read,
            snapshot.stats.skipped
        );
        Ok(snapshot)
    }

    /// The current snapshot, loading it on first use.
    ///
    /// Once a snapshot exists this never fails: a broken source only
    /// surfaces on [`refresh`](BoundaryStore::refresh), and readers keep the
    /// stale-but-usable data.
    pub fn current(&self) -> Result<Arc<BoundarySnapshot>, Error> {
        {
            let state = self.state.read().expect("boundary store lock poisoned");
            if let Some(ref snapshot) = state.snapshot {
                return Ok(snapshot.clone());
            }
        }

        let mut state = self.state.write().expect("boundary store lock poisoned");
        // another caller may have loaded while we waited for the write lock
        if let Some(ref snapshot) = state.snapshot {
            return Ok(snapshot.clone());
        }
        match self.load(state.next_version) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                state.snapshot = Some(snapshot.clone());
                state.next_version += 1;
                Ok(snapshot)
            }
            Err(e) => Err(Error::BoundaryUnavailable {
                cause: e.to_string(),
            }),
        }
    }

    /// Reload the source and atomically publish the new snapshot.
    ///
    /// On failure the previous snapshot stays current and the load error is
    /// returned to the caller (which may retry with backoff).
    pub fn refresh(&self) -> Result<Arc<BoundarySnapshot>, failure::Error> {
        let version = self
            .state
            .read()
            .expect("boundary store lock poisoned")
            .next_version;

        match self.load(version) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let mut state = self.state.write().expect("boundary store lock poisoned");
                state.snapshot = Some(snapshot.clone());
                state.next_version = version + 1;
                Ok(snapshot)
            }
            Err(e) => {
                warn!("boundary refresh failed, keeping the previous snapshot: {}", e);
                Err(e)
            }
        }
    }
}
