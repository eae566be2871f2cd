use failure::format_err;
use std::path::Path;

/// Supported boundary source encodings, deduced from the file name.
#[derive(PartialEq, Clone, Debug)]
pub enum InputFormat {
    Json,
    JsonGz,
}

static ALL_EXTENSIONS: [(&str, InputFormat); 4] = [
    (".json", InputFormat::Json),
    (".geojson", InputFormat::Json),
    (".json.gz", InputFormat::JsonGz),
    (".geojson.gz", InputFormat::JsonGz),
];

impl InputFormat {
    pub fn from_filename(filename: impl AsRef<Path>) -> Result<InputFormat, failure::Error> {
        ALL_EXTENSIONS
            .iter()
            .find(|(extension, _)| {
                filename
                    .as_ref()
                    .file_name()
                    .and_then(|f| f.to_str())
                    .map_or(false, |f| f.ends_with(extension))
            })
            .map(|(_, format)| format.clone())
            .ok_or_else(|| {
                let accepted = ALL_EXTENSIONS
                    .iter()
                    .map(|(e, _)| *e)
                    .collect::<Vec<_>>()
                    .join(", ");
                format_err!(
                    "unable to detect the boundary format from '{}', accepted extensions are: {}",
                    filename.as_ref().display(),
                    accepted
                )
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn format_detection() {
        assert_eq!(
            InputFormat::from_filename("boundaries.geojson").unwrap(),
            InputFormat::Json
        );
        assert_eq!(
            InputFormat::from_filename("/data/ps.json").unwrap(),
            InputFormat::Json
        );
        assert_eq!(
            InputFormat::from_filename("ps.json.gz").unwrap(),
            InputFormat::JsonGz
        );
        assert_eq!(
            InputFormat::from_filename("ps.geojson.gz").unwrap(),
            InputFormat::JsonGz
        );
        assert!(InputFormat::from_filename("boundaries.shp").is_err());
    }
}
