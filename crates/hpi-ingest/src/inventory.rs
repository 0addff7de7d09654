use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Dataset;

/// Extension carried by every monthly report in the input folder.
pub const DOCUMENT_EXTENSION: &str = "html";

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Folder '{}' does not exist.", .0.display())]
    MissingInputFolder(PathBuf),
    #[error("Failed to list '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Path of the report for `month` inside `folder`.
pub fn document_path(folder: &Path, month: &str) -> PathBuf {
    folder.join(format!("{month}.{DOCUMENT_EXTENSION}"))
}

/// Stems of every report file in `folder`.
pub fn available_months(folder: &Path) -> Result<BTreeSet<String>, InventoryError> {
    if !folder.is_dir() {
        return Err(InventoryError::MissingInputFolder(folder.to_path_buf()));
    }

    let io_err = |source: std::io::Error| InventoryError::Io {
        path: folder.to_path_buf(),
        source,
    };

    let mut months = BTreeSet::new();
    for entry in fs::read_dir(folder).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
            continue;
        }
        // Only the last extension is dropped, so the stem always maps back to
        // this file through `document_path`.
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            months.insert(stem.to_string());
        }
    }

    Ok(months)
}

/// Months with a report in `folder` but no value anywhere in `dataset`, ascending.
pub fn pending_months(dataset: &Dataset, folder: &Path) -> Result<Vec<String>, InventoryError> {
    let processed = dataset.processed_months();
    let available = available_months(folder)?;

    log::debug!(
        "{} month(s) processed, {} available in {}",
        processed.len(),
        available.len(),
        folder.display()
    );

    Ok(available.difference(&processed).cloned().collect())
}
