use std::fs;
use std::path::{Path, PathBuf};

use crate::inventory::{self, InventoryError};
use crate::parser::parse_report;
use crate::store::{self, StoreError};
use crate::utils::IngestReport;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

#[derive(Debug)]
pub enum IngestOutcome {
    /// Every report in the input folder is already in the dataset. Nothing was written.
    UpToDate,
    Updated(IngestReport),
}

/// Milestones reported while a run is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    /// Months about to be processed, ascending.
    Pending(&'a [String]),
    Processing(&'a Path),
}

/// Merges monthly reports that are not yet in the dataset file.
#[derive(Debug, Clone)]
pub struct Ingester {
    dataset_path: PathBuf,
    input_dir: PathBuf,
}

impl Ingester {
    pub fn new(dataset_path: impl Into<PathBuf>, input_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            input_dir: input_dir.into(),
        }
    }

    pub fn run(&self) -> Result<IngestOutcome, IngestError> {
        self.run_with(|_| {})
    }

    /// Same as [`Ingester::run`], calling `on_progress` before the work list
    /// is processed and before each report is read.
    pub fn run_with<F>(&self, mut on_progress: F) -> Result<IngestOutcome, IngestError>
    where
        F: FnMut(Progress<'_>),
    {
        // Both inputs must exist before anything is read.
        if !self.dataset_path.exists() {
            return Err(StoreError::MissingDatasetFile(self.dataset_path.clone()).into());
        }
        if !self.input_dir.is_dir() {
            return Err(InventoryError::MissingInputFolder(self.input_dir.clone()).into());
        }

        let mut dataset = store::load(&self.dataset_path)?;
        let pending = inventory::pending_months(&dataset, &self.input_dir)?;

        if pending.is_empty() {
            log::info!("No new reports in {}", self.input_dir.display());
            return Ok(IngestOutcome::UpToDate);
        }

        log::debug!(
            "Found {} new file(s) to process: {}",
            pending.len(),
            pending.join(", ")
        );
        on_progress(Progress::Pending(&pending));

        let mut report = IngestReport {
            dataset_path: self.dataset_path.clone(),
            ..Default::default()
        };

        for month in &pending {
            let path = inventory::document_path(&self.input_dir, month);
            log::debug!("Processing {}", path.display());
            on_progress(Progress::Processing(&path));

            let html = match fs::read_to_string(&path) {
                Ok(html) => html,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    report.unreadable_months.push(month.clone());
                    continue;
                }
            };

            let records = parse_report(&html, month);
            if records.is_empty() {
                log::warn!("{} yielded no records", path.display());
            }

            report.new_cities.extend(
                records
                    .iter()
                    .filter(|r| !dataset.contains_city(&r.city))
                    .map(|r| r.city.clone()),
            );
            dataset.merge_records(month, &records);
            report.record_month(month, &records);
        }

        store::save(&self.dataset_path, &dataset)?;

        report.total_cities = dataset.city_count();
        report.total_values = dataset.record_count();

        Ok(IngestOutcome::Updated(report))
    }
}
