use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

pub fn load_data_from_csv<T: DeserializeOwned, const DELIMITER: u8>(
    file_path: &Path,
) -> Result<Vec<T>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(DELIMITER)
        .from_path(file_path)?;
    reader.deserialize().collect()
}

pub fn dump_data_to_csv<'a, T: 'a + Serialize>(
    data: impl IntoIterator<Item = &'a T>,
    file_path: &Path,
) -> Result<(), csv::Error> {
    dump_data_to_writer(data, std::fs::File::create(file_path)?)
}

/// Writes one record per item, preceded by a header row taken from the
/// field names of `T`.
pub fn dump_data_to_writer<'a, T: 'a + Serialize>(
    data: impl IntoIterator<Item = &'a T>,
    writer: impl Write,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for entry in data {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}
