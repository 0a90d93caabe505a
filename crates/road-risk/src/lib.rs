//! Road Risk Dashboard Core
//!
//! Loads road segments with precomputed risk scores, filters them by
//! city and derives everything the dashboard shows: map markers, the
//! top-N table, per-category lists and the placeholder trend series.
//!
//! # Pipeline
//!
//! ```text
//! CSV -> loader -> RoadTable -> filter_by_city -> city table
//!                                                  |-> classify -> map::render
//!                                                  `-> summary (top-N, buckets), trend
//! ```
//!
//! # Risk Categories
//!
//! | Category | Score range        | Color  |
//! |----------|--------------------|--------|
//! | High     | `s >= 0.6`         | red    |
//! | Medium   | `0.3 <= s < 0.6`   | orange |
//! | Low      | `s < 0.3`          | green  |

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod classifier;
pub mod dashboard;
pub mod filter;
pub mod loader;
pub mod map;
pub mod summary;
pub mod trend;

pub use classifier::{classify, RiskCategory, RiskColor};
pub use dashboard::{Dashboard, DashboardOptions, DashboardView, DashboardWarning};
pub use filter::{filter_by_city, CitySelector};
pub use loader::{LoadedTable, SkippedRow};
pub use map::{MapView, Marker};

/// Columns every dataset must carry, in file order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["city", "road_name", "risk_score", "latitude", "longitude"];

/// Default dataset location relative to the working directory
pub const DEFAULT_DATA_PATH: &str = "data/roads_data.csv";

/// Rows shown in the top risky roads table
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

pub type Result<T> = std::result::Result<T, DataLoadError>;

/// One row of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub city: String,
    pub road_name: String,
    /// Nominally in [0, 1]; out-of-range values are kept as-is
    pub risk_score: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl RoadSegment {
    pub fn new(
        city: impl Into<String>,
        road_name: impl Into<String>,
        risk_score: f64,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            city: city.into(),
            road_name: road_name.into(),
            risk_score,
            latitude,
            longitude,
        }
    }

    pub fn category(&self) -> RiskCategory {
        RiskCategory::from_score(self.risk_score)
    }

    /// Risk score as a percentage (score x 100)
    pub fn risk_percent(&self) -> f64 {
        self.risk_score * 100.0
    }
}

/// Ordered, read-only collection of road segments.
///
/// Never mutated after construction: filtering produces a new table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadTable {
    rows: Vec<RoadSegment>,
}

impl RoadTable {
    pub fn new(rows: Vec<RoadSegment>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RoadSegment] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoadSegment> {
        self.rows.iter()
    }

    /// Mean risk score, `None` for an empty table
    pub fn mean_risk(&self) -> Option<f64> {
        map::running_mean(self.rows.iter().map(|r| r.risk_score))
    }
}

impl FromIterator<RoadSegment> for RoadTable {
    fn from_iter<I: IntoIterator<Item = RoadSegment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RoadTable {
    type Item = &'a RoadSegment;
    type IntoIter = std::slice::Iter<'a, RoadSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
