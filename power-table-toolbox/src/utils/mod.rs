pub mod csv;
pub mod serde;

use crate::Error;
use ::serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads a JSON or YAML document, picked after the file extension.
pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let reader = BufReader::new(File::open(path)?);
    match extension.as_str() {
        "json" => Ok(serde_json::from_reader(reader)?),
        "yaml" | "yml" => Ok(serde_yaml::from_reader(reader)?),
        _ => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}
