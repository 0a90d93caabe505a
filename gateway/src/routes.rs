use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::page;
use crate::state::{AppState, ReloadError, Snapshot};
use road_risk::map::FeatureCollection;
use road_risk::summary::{bucket_by_category, top_n, CategoryBuckets, TopRoad};
use road_risk::trend::{synthetic_trend, today, TrendSeries};
use road_risk::{filter_by_city, map, DashboardView, MapView, RoadTable, SkippedRow};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("No city given and the dataset has no cities")]
    NoCities,
    #[error(transparent)]
    Reload(#[from] ReloadError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NoCities => StatusCode::NOT_FOUND,
            ApiError::Reload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!("{}", self);
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

#[derive(Serialize)]
pub struct CitiesResponse {
    pub cities: Vec<String>,
    pub default_city: Option<String>,
}

#[derive(Serialize)]
pub struct DatasetResponse {
    pub path: String,
    pub rows: usize,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub n: Option<usize>,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.current().await;
    Html(page::render_index(snapshot.dashboard.selector()))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.current().await;
    Json(serde_json::json!({
        "status": "healthy",
        "service": "road-risk-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "rows": snapshot.dashboard.table().len(),
    }))
}

pub async fn list_cities(State(state): State<AppState>) -> Json<CitiesResponse> {
    let snapshot = state.current().await;
    let selector = snapshot.dashboard.selector();

    Json(CitiesResponse {
        cities: selector.cities().to_vec(),
        default_city: selector.default_city().map(str::to_string),
    })
}

/// City selection: recompute the full view for `?city=` (or the default city)
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let snapshot = state.current().await;
    let dashboard = &snapshot.dashboard;

    let city = match query.city {
        Some(city) => city,
        None => dashboard
            .selector()
            .default_city()
            .map(str::to_string)
            .ok_or(ApiError::NoCities)?,
    };

    Ok(Json(dashboard.on_city_changed(&city)))
}

fn city_rows(snapshot: &Snapshot, city: &str) -> RoadTable {
    filter_by_city(snapshot.dashboard.table(), city)
}

pub async fn city_markers(State(state): State<AppState>, Path(city): Path<String>) -> Json<MapView> {
    let snapshot = state.current().await;
    Json(map::render(&city_rows(&snapshot, &city)))
}

pub async fn city_geojson(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Json<FeatureCollection> {
    let snapshot = state.current().await;
    Json(map::render(&city_rows(&snapshot, &city)).to_geojson())
}

pub async fn city_top(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(query): Query<TopQuery>,
) -> Json<Vec<TopRoad>> {
    let snapshot = state.current().await;
    let n = query.n.unwrap_or(snapshot.dashboard.options().top_n);
    Json(top_n(&city_rows(&snapshot, &city), n))
}

pub async fn city_categories(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Json<CategoryBuckets> {
    let snapshot = state.current().await;
    Json(bucket_by_category(&city_rows(&snapshot, &city)))
}

pub async fn city_trend(State(state): State<AppState>, Path(city): Path<String>) -> Json<TrendSeries> {
    let snapshot = state.current().await;
    let seed = snapshot.dashboard.options().trend_seed;
    Json(synthetic_trend(&city_rows(&snapshot, &city), today(), seed))
}

pub async fn dataset(State(state): State<AppState>) -> Json<DatasetResponse> {
    let snapshot = state.current().await;
    Json(DatasetResponse {
        path: state.config.path.display().to_string(),
        rows: snapshot.dashboard.table().len(),
        skipped: snapshot.skipped.clone(),
    })
}

pub async fn reload_dataset(State(state): State<AppState>) -> Result<Json<DatasetResponse>, ApiError> {
    let snapshot = state.reload().await?;
    tracing::info!("Dataset reloaded from {}", state.config.path.display());

    Ok(Json(DatasetResponse {
        path: state.config.path.display().to_string(),
        rows: snapshot.dashboard.table().len(),
        skipped: snapshot.skipped.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DatasetConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use road_risk::DashboardOptions;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tower::ServiceExt;

    const SAMPLE_CSV: &str = "city,road_name,risk_score,latitude,longitude\n\
                              Karachi,A,0.9,24.8,67.0\n\
                              Karachi,B,0.4,24.9,67.1\n\
                              Karachi,Bad,n/a,24.9,67.1\n\
                              Lahore,C,0.1,31.5,74.3\n";

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn state_for(file: &NamedTempFile, cities: Vec<String>) -> AppState {
        state_with_options(file, cities, DashboardOptions::default())
    }

    fn state_with_options(file: &NamedTempFile, cities: Vec<String>, options: DashboardOptions) -> AppState {
        let config = DatasetConfig {
            path: file.path().to_path_buf(),
            cities,
            options,
        };
        let snapshot = config.load().unwrap();
        AppState::new(config, snapshot)
    }

    async fn send(state: AppState, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = crate::app(state)
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        send(state, Method::GET, uri).await
    }

    #[tokio::test]
    async fn test_dashboard_for_karachi() {
        let file = write_csv(SAMPLE_CSV);
        let (status, body) = get_json(state_for(&file, vec![]), "/api/v1/dashboard?city=Karachi").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_rows"], 2);
        assert_eq!(body["map"]["markers"][0]["color"], "red");
        assert_eq!(body["map"]["markers"][1]["color"], "orange");
        assert_eq!(body["top_roads"][0]["road_name"], "A");
        assert_eq!(body["top_roads"][0]["risk_percent_display"], "90.0%");
        assert_eq!(body["trend"]["placeholder"], true);
        assert_eq!(body["warnings"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_dashboard_defaults_to_first_city() {
        let file = write_csv(SAMPLE_CSV);
        let (status, body) = get_json(state_for(&file, vec![]), "/api/v1/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["city"], "Karachi");
    }

    #[tokio::test]
    async fn test_unknown_city_is_empty_not_error() {
        let file = write_csv(SAMPLE_CSV);
        let state = state_for(&file, vec![]);

        let (status, body) = get_json(state.clone(), "/api/v1/dashboard?city=Quetta").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_rows"], 0);
        assert_eq!(body["map"]["fallback"], true);
        assert_eq!(body["warnings"][0]["kind"], "empty_result");

        let (status, body) = get_json(state.clone(), "/api/v1/cities/Quetta/top").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 0);

        let (status, body) = get_json(state, "/api/v1/cities/Quetta/trend").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_city_endpoints() {
        let file = write_csv(SAMPLE_CSV);
        let state = state_for(&file, vec![]);

        let (_, markers) = get_json(state.clone(), "/api/v1/cities/Karachi/markers").await;
        assert_eq!(markers["markers"].as_array().unwrap().len(), 2);

        let (_, geojson) = get_json(state.clone(), "/api/v1/cities/Karachi/map.geojson").await;
        assert_eq!(geojson["type"], "FeatureCollection");
        assert_eq!(geojson["features"][0]["geometry"]["coordinates"][0], 67.0);

        let (_, top) = get_json(state.clone(), "/api/v1/cities/Karachi/top?n=1").await;
        assert_eq!(top.as_array().unwrap().len(), 1);

        let (_, buckets) = get_json(state, "/api/v1/cities/Karachi/categories").await;
        assert_eq!(buckets["high"][0]["road_name"], "A");
        assert_eq!(buckets["medium"][0]["road_name"], "B");
        assert_eq!(buckets["low"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_city_top_uses_snapshot_options() {
        let file = write_csv(SAMPLE_CSV);
        let options = DashboardOptions {
            top_n: 1,
            ..Default::default()
        };
        let state = state_with_options(&file, vec![], options);

        let (_, top) = get_json(state.clone(), "/api/v1/cities/Karachi/top").await;
        assert_eq!(top.as_array().unwrap().len(), 1);
        assert_eq!(top[0]["road_name"], "A");

        let (_, explicit) = get_json(state, "/api/v1/cities/Karachi/top?n=5").await;
        assert_eq!(explicit.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_city_trend_uses_snapshot_seed() {
        let file = write_csv(SAMPLE_CSV);
        let options = DashboardOptions {
            trend_seed: 11,
            ..Default::default()
        };
        let state = state_with_options(&file, vec![], options);

        let (_, trend) = get_json(state.clone(), "/api/v1/cities/Karachi/trend").await;
        let (_, view) = get_json(state, "/api/v1/dashboard?city=Karachi").await;
        assert_eq!(trend, view["trend"]);
    }

    #[tokio::test]
    async fn test_cities_from_config() {
        let file = write_csv(SAMPLE_CSV);
        let cities = vec!["Karachi".to_string(), "Lahore".to_string(), "Sargodha".to_string()];
        let (_, body) = get_json(state_for(&file, cities), "/api/v1/cities").await;

        assert_eq!(body["cities"], serde_json::json!(["Karachi", "Lahore", "Sargodha"]));
        assert_eq!(body["default_city"], "Karachi");
    }

    #[tokio::test]
    async fn test_dataset_reports_skipped_rows() {
        let file = write_csv(SAMPLE_CSV);
        let (_, body) = get_json(state_for(&file, vec![]), "/api/v1/dataset").await;

        assert_eq!(body["rows"], 3);
        assert_eq!(body["skipped"][0]["line"], 4);
    }

    #[tokio::test]
    async fn test_reload_swaps_table() {
        let mut file = write_csv(SAMPLE_CSV);
        let state = state_for(&file, vec![]);

        file.write_all(b"Sargodha,D,0.7,32.08,72.67\n").unwrap();
        file.flush().unwrap();

        let (status, body) = send(state.clone(), Method::POST, "/api/v1/dataset/reload").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 4);

        let (_, cities) = get_json(state, "/api/v1/cities").await;
        assert_eq!(cities["cities"], serde_json::json!(["Karachi", "Lahore", "Sargodha"]));
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_table() {
        let file = write_csv(SAMPLE_CSV);
        let state = state_for(&file, vec![]);
        std::fs::write(file.path(), "city,road_name\nKarachi,A\n").unwrap();

        let (status, body) = send(state.clone(), Method::POST, "/api/v1/dataset/reload").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("risk_score"));

        let (_, health) = get_json(state, "/health").await;
        assert_eq!(health["rows"], 3);
    }

    #[tokio::test]
    async fn test_no_cities_is_not_found() {
        let file = write_csv("city,road_name,risk_score,latitude,longitude\n");
        let (status, body) = get_json(state_for(&file, vec![]), "/api/v1/dashboard").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_index_page() {
        let file = write_csv(SAMPLE_CSV);
        let response = crate::app(state_for(&file, vec![]))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"<option value="Lahore">Lahore</option>"#));
        assert!(html.contains("Top Risky Roads"));
    }
}
