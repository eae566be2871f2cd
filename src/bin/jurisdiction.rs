use failure::{Error, ResultExt};
use jurisdiction::{
    BoundaryStore, JurisdictionEngine, MasterDistrict, MasterStation, ResolveOptions,
};
use log::error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use structopt::StructOpt;

/// Resolve the police jurisdiction owning a GPS coordinate.
#[derive(StructOpt, Debug)]
struct Args {
    /// Boundary FeatureCollection. Accepted extensions are
    /// '.json', '.geojson', '.json.gz', '.geojson.gz'
    #[structopt(short = "b", long = "boundaries")]
    boundaries: PathBuf,
    /// Latitude of the point to resolve, WGS-84 degrees
    #[structopt(long = "lat")]
    latitude: f64,
    /// Longitude of the point to resolve, WGS-84 degrees
    #[structopt(long = "lon")]
    longitude: f64,
    /// Master station list, a json array of {id, name, district_id?, location?}
    #[structopt(short = "s", long = "stations")]
    stations: Option<PathBuf>,
    /// Master district list, a json array of {id, name}
    #[structopt(short = "d", long = "districts")]
    districts: Option<PathBuf>,
    /// Resolution options as json (threshold, property keys, prefixes)
    #[structopt(short = "o", long = "options")]
    options: Option<PathBuf>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T, Error> {
    let file = File::open(path).with_context(|_| format!("cannot open {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|_| format!("invalid json in {}", path.display()))?;
    Ok(value)
}

fn run(args: Args) -> Result<(), Error> {
    let options = match args.options {
        Some(ref path) => read_json::<ResolveOptions>(path)?,
        None => ResolveOptions::default(),
    };
    let stations: Vec<MasterStation> = match args.stations {
        Some(ref path) => read_json(path)?,
        None => vec![],
    };
    let districts: Vec<MasterDistrict> = match args.districts {
        Some(ref path) => read_json(path)?,
        None => vec![],
    };

    let store = BoundaryStore::from_path(args.boundaries)?;
    let engine = JurisdictionEngine::new(store, options);

    let result = engine.resolve(args.latitude, args.longitude, &stations, &districts)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn init_logger() {
    let mut builder = env_logger::Builder::new();
    builder.filter(None, log::LevelFilter::Info);
    if let Ok(s) = std::env::var("RUST_LOG") {
        builder.parse(&s);
    }
    builder.init();
}

fn main() {
    init_logger();
    let args = Args::from_args();
    if let Err(e) = run(args) {
        error!("jurisdiction resolution failed: {:?}", e);
        e.iter_chain().for_each(|cause| {
            error!("{}", cause);
        });
        std::process::exit(1);
    }
}
