//! City selection handler
//!
//! Every city change recomputes the whole view from the loaded table:
//! filter, classify, map markers, top-N, category lists and trend.

use crate::summary::{bucket_by_category, top_n, CategoryBuckets, TopRoad};
use crate::trend::{self, synthetic_trend, TrendSeries};
use crate::{filter_by_city, map, CitySelector, MapView, RoadTable, DEFAULT_TOP_N};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Rows in the top risky roads table
    pub top_n: usize,
    /// Seed for the placeholder trend generator
    pub trend_seed: u64,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            trend_seed: 0,
        }
    }
}

/// Non-fatal conditions surfaced alongside a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardWarning {
    /// No rows for the selected city; the view renders empty
    EmptyResult { city: String },
}

/// Everything the page shows for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub city: String,
    /// Rows for this city
    pub total_rows: usize,
    pub map: MapView,
    pub top_roads: Vec<TopRoad>,
    pub buckets: CategoryBuckets,
    pub trend: TrendSeries,
    pub warnings: Vec<DashboardWarning>,
}

/// Loaded table plus the selector and view options built over it
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Arc<RoadTable>,
    selector: CitySelector,
    options: DashboardOptions,
}

impl Dashboard {
    /// Selector options come from the table's own cities
    pub fn new(table: Arc<RoadTable>, options: DashboardOptions) -> Self {
        let selector = CitySelector::from_table(&table);
        Self::with_selector(table, selector, options)
    }

    pub fn with_selector(table: Arc<RoadTable>, selector: CitySelector, options: DashboardOptions) -> Self {
        Self {
            table,
            selector,
            options,
        }
    }

    pub fn table(&self) -> &RoadTable {
        &self.table
    }

    pub fn selector(&self) -> &CitySelector {
        &self.selector
    }

    pub fn options(&self) -> DashboardOptions {
        self.options
    }

    /// The city selection handler, dated today
    pub fn on_city_changed(&self, city: &str) -> DashboardView {
        self.view_for(city, trend::today())
    }

    /// Same as [`Dashboard::on_city_changed`] with an explicit trend end date
    pub fn view_for(&self, city: &str, today: NaiveDate) -> DashboardView {
        let city_table = filter_by_city(&self.table, city);
        debug!("City {:?}: {} of {} rows", city, city_table.len(), self.table.len());

        let mut warnings = Vec::new();
        if city_table.is_empty() {
            info!("No data available for city {:?}", city);
            warnings.push(DashboardWarning::EmptyResult {
                city: city.to_string(),
            });
        }

        DashboardView {
            city: city.to_string(),
            total_rows: city_table.len(),
            map: map::render(&city_table),
            top_roads: top_n(&city_table, self.options.top_n),
            buckets: bucket_by_category(&city_table),
            trend: synthetic_trend(&city_table, today, self.options.trend_seed),
            warnings,
        }
    }
}
