use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::types::Dataset;

const INDENT: &[u8] = b"    ";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("'{}' does not exist. Run the initial parse first to generate the dataset.", .0.display())]
    MissingDatasetFile(PathBuf),
    #[error("Failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{}' is not a valid dataset: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads the persisted dataset.
pub fn load(path: &Path) -> Result<Dataset, StoreError> {
    if !path.exists() {
        return Err(StoreError::MissingDatasetFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset: Dataset = serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Loaded {} city record(s) ({} values) from {}",
        dataset.city_count(),
        dataset.record_count(),
        path.display()
    );

    Ok(dataset)
}

/// Pretty JSON with four-space indentation; non-ASCII text is written as-is.
pub fn to_json(dataset: &Dataset) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    dataset.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Writes the dataset, replacing whatever is at `path`.
///
/// The bytes go to a sibling file first and are renamed into place.
pub fn save(path: &Path, dataset: &Dataset) -> Result<(), StoreError> {
    let json = to_json(dataset).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, &json).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&tmp_path, path) {
        if let Err(e) = fs::remove_file(&tmp_path) {
            log::warn!("Failed to remove {}: {}", tmp_path.display(), e);
        }
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    log::info!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}
