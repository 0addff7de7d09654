use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Housing category. Each one is published as its own table in a monthly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    NewBuild,
    Secondhand,
}

impl PropertyType {
    pub const ALL: [PropertyType; 2] = [PropertyType::NewBuild, PropertyType::Secondhand];

    /// Key used for this category inside the dataset.
    pub fn tag(&self) -> &'static str {
        match self {
            PropertyType::NewBuild => "new-build",
            PropertyType::Secondhand => "secondhand",
        }
    }

    /// Position of this category's table within a report, in document order.
    pub fn table_index(&self) -> usize {
        match self {
            PropertyType::NewBuild => 0,
            PropertyType::Secondhand => 1,
        }
    }
}

/// One index value pulled out of a report table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub city: String,
    pub property_type: PropertyType,
    pub value: String,
}

/// Month identifier → raw index text.
pub type Series = BTreeMap<String, String>;

/// Property-type tag → series.
pub type CityRecord = BTreeMap<String, Series>;

/// City → property-type tag → month → index value.
///
/// Tags are kept as plain strings so that a baseline file written with other
/// tags survives a load/save cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(BTreeMap<String, CityRecord>);

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the series for `city`/`tag`, creating empty levels on the way.
    pub fn series_mut(&mut self, city: &str, tag: &str) -> &mut Series {
        self.0
            .entry(city.to_string())
            .or_default()
            .entry(tag.to_string())
            .or_default()
    }

    /// Sets `dataset[city][property_type][month] = value`. Last write wins.
    pub fn merge(&mut self, city: &str, property_type: PropertyType, month: &str, value: &str) {
        self.series_mut(city, property_type.tag())
            .insert(month.to_string(), value.to_string());
    }

    pub fn merge_records(&mut self, month: &str, records: &[IndexRecord]) {
        for record in records {
            self.merge(&record.city, record.property_type, month, &record.value);
        }
    }

    /// Every month key present under any city and any property type.
    pub fn processed_months(&self) -> BTreeSet<String> {
        self.0
            .values()
            .flat_map(|city| city.values())
            .flat_map(|series| series.keys())
            .cloned()
            .collect()
    }

    pub fn get(&self, city: &str, property_type: PropertyType, month: &str) -> Option<&str> {
        self.0
            .get(city)?
            .get(property_type.tag())?
            .get(month)
            .map(String::as_str)
    }

    pub fn contains_city(&self, city: &str) -> bool {
        self.0.contains_key(city)
    }

    pub fn city_count(&self) -> usize {
        self.0.len()
    }

    /// Number of (city, type, month) entries.
    pub fn record_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|city| city.values())
            .map(|series| series.len())
            .sum()
    }
}
