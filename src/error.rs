use failure_derive::Fail;

/// Errors a resolution call can surface to its caller.
///
/// "No jurisdiction matched" is deliberately not in here: an unmatched
/// coordinate is a common, expected outcome (a citizen outside every mapped
/// boundary) and is encoded in the resolution result instead.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(
        display = "invalid coordinate: latitude {} / longitude {} out of WGS-84 range",
        latitude, longitude
    )]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// No boundary snapshot has ever been loaded and the source is unusable.
    /// As long as one load succeeded, resolutions keep running against the
    /// last good snapshot instead of raising this.
    #[fail(display = "no boundary snapshot available: {}", cause)]
    BoundaryUnavailable { cause: String },
}
