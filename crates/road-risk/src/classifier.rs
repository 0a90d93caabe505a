//! Risk classification by fixed score thresholds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores at or above this are High
pub const HIGH_RISK_THRESHOLD: f64 = 0.6;

/// Scores at or above this (and below High) are Medium
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    High,
    Medium,
    Low,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 3] = [RiskCategory::High, RiskCategory::Medium, RiskCategory::Low];

    /// Total over f64. Lower bounds are closed: 0.6 is High, 0.3 is Medium.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn color(&self) -> RiskColor {
        match self {
            Self::High => RiskColor::Red,
            Self::Medium => RiskColor::Orange,
            Self::Low => RiskColor::Green,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Marker color for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Red,
    Orange,
    Green,
}

impl RiskColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for RiskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a risk score into its category and display color
pub fn classify(risk_score: f64) -> (RiskCategory, RiskColor) {
    let category = RiskCategory::from_score(risk_score);
    (category, category.color())
}
