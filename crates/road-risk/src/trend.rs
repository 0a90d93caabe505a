//! High-risk trend series
//!
//! There is no historical data behind this series. Counts are synthetic,
//! drawn from a Poisson distribution around the city's mean risk, and
//! every series is marked `placeholder: true` so the page can say so.

use crate::RoadTable;
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Days covered by the series, ending today
pub const TREND_DAYS: u64 = 7;

/// Label attached to every synthetic series
pub const PLACEHOLDER_LABEL: &str = "Synthetic placeholder data";

/// Upper bound on the Poisson mean; keeps out-of-range scores cheap to sample
const MAX_TREND_BASE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// ISO date, e.g. "2024-05-01"
    pub day_label: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub placeholder: bool,
    pub label: String,
    pub points: Vec<TrendPoint>,
}

/// Local calendar date the series ends on
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Poisson mean for a table: `max(round(mean_risk * 10), 1)`
pub fn trend_base(table: &RoadTable) -> Option<u32> {
    let mean = table.mean_risk()?;
    let base = (mean * 10.0).round().clamp(1.0, MAX_TREND_BASE as f64);
    Some(base as u32)
}

/// Placeholder series for the last [`TREND_DAYS`] days ending on `today`.
///
/// Empty when the table has no rows. Same table, day and seed always
/// give the same series.
pub fn synthetic_trend(table: &RoadTable, today: NaiveDate, seed: u64) -> TrendSeries {
    let points = match trend_base(table) {
        Some(base) => {
            let mut rng = StdRng::seed_from_u64(seed);
            debug!("Generating placeholder trend (base={}, seed={})", base, seed);

            (0..TREND_DAYS)
                .rev()
                .map(|back| {
                    let day = today.checked_sub_days(Days::new(back)).unwrap_or(today);
                    TrendPoint {
                        day_label: day.format("%Y-%m-%d").to_string(),
                        count: sample_poisson(&mut rng, base as f64),
                    }
                })
                .collect()
        }
        None => Vec::new(),
    };

    TrendSeries {
        placeholder: true,
        label: PLACEHOLDER_LABEL.to_string(),
        points,
    }
}

/// Knuth's multiplication method; fine for small means
fn sample_poisson<R: Rng>(rng: &mut R, lambda: f64) -> u32 {
    let limit = (-lambda).exp();
    let mut k = 0u32;
    let mut p = 1.0f64;
    loop {
        p *= rng.gen::<f64>();
        if p <= limit {
            return k;
        }
        k += 1;
    }
}
