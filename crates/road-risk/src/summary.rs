//! Tabular summaries of a city's road segments

use crate::{RiskCategory, RoadSegment};
use serde::{Deserialize, Serialize};

/// One row of the top risky roads table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRoad {
    /// 1-based position in the table
    pub rank: usize,
    pub road_name: String,
    pub risk_percent: f64,
    /// e.g. "90.0%"
    pub risk_percent_display: String,
    pub category: RiskCategory,
}

/// Road entry in a category list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRoad {
    pub road_name: String,
    pub risk_score: f64,
}

impl From<&RoadSegment> for BucketRoad {
    fn from(segment: &RoadSegment) -> Self {
        Self {
            road_name: segment.road_name.clone(),
            risk_score: segment.risk_score,
        }
    }
}

/// Rows partitioned by risk category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBuckets {
    pub high: Vec<BucketRoad>,
    pub medium: Vec<BucketRoad>,
    pub low: Vec<BucketRoad>,
}

impl CategoryBuckets {
    pub fn get(&self, category: RiskCategory) -> &[BucketRoad] {
        match category {
            RiskCategory::High => &self.high,
            RiskCategory::Medium => &self.medium,
            RiskCategory::Low => &self.low,
        }
    }

    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The `n` riskiest rows, highest score first.
///
/// Sort is stable, so equal scores keep their input order.
pub fn top_n<'a>(rows: impl IntoIterator<Item = &'a RoadSegment>, n: usize) -> Vec<TopRoad> {
    let mut sorted: Vec<&RoadSegment> = rows.into_iter().collect();
    sorted.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

    sorted
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, r)| {
            let risk_percent = r.risk_percent();
            TopRoad {
                rank: i + 1,
                road_name: r.road_name.clone(),
                risk_percent,
                risk_percent_display: format!("{:.1}%", risk_percent),
                category: r.category(),
            }
        })
        .collect()
}

/// Partition rows into High / Medium / Low, keeping input order
pub fn bucket_by_category<'a>(rows: impl IntoIterator<Item = &'a RoadSegment>) -> CategoryBuckets {
    let mut buckets = CategoryBuckets::default();
    for r in rows {
        let bucket = match r.category() {
            RiskCategory::High => &mut buckets.high,
            RiskCategory::Medium => &mut buckets.medium,
            RiskCategory::Low => &mut buckets.low,
        };
        bucket.push(r.into());
    }
    buckets
}
