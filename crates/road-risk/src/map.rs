//! Map marker computation
//!
//! Produces the marker descriptors and view window for a city map.
//! Drawing is left to the presentation host.

use crate::{classify, RiskCategory, RiskColor, RoadSegment};
use geojson::{Feature, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};

pub use geojson::FeatureCollection;

/// Centre used when there is nothing to show (Pakistan)
pub const FALLBACK_CENTER: (f64, f64) = (30.3753, 69.3451);

/// Zoom for the fallback view
pub const FALLBACK_ZOOM: u8 = 5;

/// Zoom for a city view
pub const CITY_ZOOM: u8 = 12;

/// A single map annotation for one road segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub color: RiskColor,
    pub category: RiskCategory,
    pub label: String,
    pub road_name: String,
    pub risk_score: f64,
    pub risk_percent: f64,
}

impl Marker {
    pub fn from_segment(segment: &RoadSegment) -> Self {
        let (category, color) = classify(segment.risk_score);
        let risk_percent = segment.risk_percent();

        Self {
            lat: segment.latitude,
            lon: segment.longitude,
            color,
            category,
            label: format!(
                "{} - Risk Score: {:.2} ({:.1}%)",
                segment.road_name, segment.risk_score, risk_percent
            ),
            road_name: segment.road_name.clone(),
            risk_score: segment.risk_score,
            risk_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// (latitude, longitude)
    pub center: (f64, f64),
    pub zoom: u8,
    /// True when `center` is the fixed fallback rather than a centroid
    pub fallback: bool,
    pub markers: Vec<Marker>,
}

impl MapView {
    /// Export markers as a GeoJSON FeatureCollection
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .markers
            .iter()
            .map(|m| {
                let mut properties = JsonObject::new();
                properties.insert("road_name".into(), m.road_name.clone().into());
                properties.insert("risk_score".into(), m.risk_score.into());
                properties.insert("risk_percent".into(), m.risk_percent.into());
                properties.insert("category".into(), m.category.label().into());
                properties.insert("color".into(), m.color.as_str().into());
                properties.insert("label".into(), m.label.clone().into());

                Feature {
                    bbox: None,
                    // GeoJSON positions are [lon, lat]
                    geometry: Some(Geometry::new(Value::Point(vec![m.lon, m.lat]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert(
            "center".into(),
            serde_json::json!([self.center.0, self.center.1]),
        );
        foreign_members.insert("zoom".into(), self.zoom.into());

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }
}

/// Build the map view for a set of rows.
///
/// Centres on the mean coordinate of the rows, or on
/// [`FALLBACK_CENTER`] when there are none or the mean is not finite.
pub fn render<'a>(rows: impl IntoIterator<Item = &'a RoadSegment>) -> MapView {
    let markers: Vec<Marker> = rows.into_iter().map(Marker::from_segment).collect();

    let lat = running_mean(markers.iter().map(|m| m.lat));
    let lon = running_mean(markers.iter().map(|m| m.lon));

    match (lat, lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => MapView {
            center: (lat, lon),
            zoom: CITY_ZOOM,
            fallback: false,
            markers,
        },
        _ => MapView {
            center: FALLBACK_CENTER,
            zoom: FALLBACK_ZOOM,
            fallback: true,
            markers,
        },
    }
}

/// Incremental mean; stays finite for large finite inputs where a plain sum overflows
pub(crate) fn running_mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut mean = None;
    for (i, x) in values.into_iter().enumerate() {
        let m = mean.unwrap_or(0.0);
        mean = Some(m + (x - m) / (i + 1) as f64);
    }
    mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_table;
    use crate::filter_by_city;

    #[test]
    fn test_render_karachi() {
        let karachi = filter_by_city(&sample_table(), "Karachi");
        let view = render(&karachi);

        assert_eq!(view.markers.len(), 2);
        assert!(!view.fallback);
        assert_eq!(view.zoom, CITY_ZOOM);
        assert!((view.center.0 - 24.85).abs() < 1e-9);
        assert!((view.center.1 - 67.05).abs() < 1e-9);

        let a = &view.markers[0];
        assert_eq!(a.color, RiskColor::Red);
        assert_eq!(a.category, RiskCategory::High);
        assert_eq!(a.label, "A - Risk Score: 0.90 (90.0%)");
        assert_eq!(view.markers[1].color, RiskColor::Orange);
    }

    #[test]
    fn test_render_empty_uses_fallback() {
        let quetta = filter_by_city(&sample_table(), "Quetta");
        let view = render(&quetta);

        assert!(view.markers.is_empty());
        assert!(view.fallback);
        assert_eq!(view.center, FALLBACK_CENTER);
        assert_eq!(view.zoom, FALLBACK_ZOOM);
    }

    #[test]
    fn test_huge_coordinates_keep_center_finite() {
        let rows = vec![
            RoadSegment::new("Karachi", "A", 0.9, 1e308, 67.0),
            RoadSegment::new("Karachi", "B", 0.4, 1e308, 67.1),
        ];
        let view = render(&rows);

        assert!(!view.fallback);
        assert_eq!(view.center.0, 1e308);
        assert!((view.center.1 - 67.05).abs() < 1e-9);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["center"][0].is_number());
    }

    #[test]
    fn test_non_finite_center_falls_back() {
        let rows = vec![
            RoadSegment::new("Karachi", "A", 0.9, 1e308, 67.0),
            RoadSegment::new("Karachi", "B", 0.4, -1e308, 67.1),
        ];
        let view = render(&rows);

        assert!(view.fallback);
        assert_eq!(view.center, FALLBACK_CENTER);
        assert_eq!(view.markers.len(), 2);
    }

    #[test]
    fn test_running_mean() {
        assert_eq!(running_mean(Vec::new()), None);
        assert_eq!(running_mean(vec![2.0, 4.0, 9.0]), Some(5.0));
    }

    #[test]
    fn test_geojson_export() {
        let view = render(sample_table().rows());
        let collection = view.to_geojson();

        assert_eq!(collection.features.len(), 3);
        let first = &collection.features[0];
        match &first.geometry.as_ref().unwrap().value {
            Value::Point(coords) => assert_eq!(coords, &vec![67.0, 24.8]),
            other => panic!("expected point, got {other:?}"),
        }
        assert_eq!(first.property("category").unwrap(), "High");
        assert_eq!(first.property("color").unwrap(), "red");

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["zoom"], 12);
    }
}
