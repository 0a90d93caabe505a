//! City filtering and selector options

use crate::RoadTable;
use serde::Serialize;
use std::collections::BTreeSet;

/// Rows whose `city` equals `city` exactly, in table order.
///
/// An unmatched city yields an empty table, not an error.
pub fn filter_by_city(table: &RoadTable, city: &str) -> RoadTable {
    table.iter().filter(|r| r.city == city).cloned().collect()
}

/// The fixed set of cities offered by the dashboard selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitySelector {
    cities: Vec<String>,
}

impl CitySelector {
    /// Explicit city list; duplicates are dropped, order kept
    pub fn new<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let cities = cities
            .into_iter()
            .map(Into::into)
            .filter(|c: &String| seen.insert(c.clone()))
            .collect();
        Self { cities }
    }

    /// Sorted unique cities present in the table
    pub fn from_table(table: &RoadTable) -> Self {
        let cities: BTreeSet<&str> = table.iter().map(|r| r.city.as_str()).collect();
        Self::new(cities)
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    /// City shown before the user picks one
    pub fn default_city(&self) -> Option<&str> {
        self.cities.first().map(String::as_str)
    }
}
