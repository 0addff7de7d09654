use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::types::{IndexRecord, PropertyType};

/// Summary of one ingestion run that found work to do.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub dataset_path: PathBuf,
    pub processed_months: Vec<String>,
    pub new_build: usize,
    pub secondhand: usize,
    /// Months whose report was read but produced no records.
    pub empty_months: Vec<String>,
    /// Months whose report could not be read at all.
    pub unreadable_months: Vec<String>,
    pub new_cities: BTreeSet<String>,
    pub total_cities: usize,
    pub total_values: usize,
}

impl IngestReport {
    pub fn record_month(&mut self, month: &str, records: &[IndexRecord]) {
        self.processed_months.push(month.to_string());
        if records.is_empty() {
            self.empty_months.push(month.to_string());
        }
        for record in records {
            match record.property_type {
                PropertyType::NewBuild => self.new_build += 1,
                PropertyType::Secondhand => self.secondhand += 1,
            }
        }
    }

    pub fn records_added(&self) -> usize {
        self.new_build + self.secondhand
    }
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Processed {} new file(s): {}",
            self.processed_months.len(),
            self.processed_months.join(", ")
        )?;
        writeln!(f, "'{}' has been updated.", self.dataset_path.display())?;
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  New-build values:   {}", self.new_build)?;
        writeln!(f, "  Secondhand values:  {}", self.secondhand)?;
        writeln!(f, "  Total added:        {}", self.records_added())?;
        if !self.new_cities.is_empty() {
            let cities: Vec<&str> = self.new_cities.iter().map(String::as_str).collect();
            writeln!(f, "  New cities:         {}", cities.join(", "))?;
        }
        if !self.empty_months.is_empty() {
            writeln!(f, "  Without records:    {}", self.empty_months.join(", "))?;
        }
        if !self.unreadable_months.is_empty() {
            writeln!(
                f,
                "  Unreadable:         {}",
                self.unreadable_months.join(", ")
            )?;
        }
        writeln!(
            f,
            "  Dataset now holds {} cities, {} values",
            self.total_cities, self.total_values
        )
    }
}
