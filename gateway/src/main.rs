//! Road Risk Gateway
//!
//! Serves the road safety dashboard and its JSON API.
//!
//! Usage:
//!   road-risk-gateway --data data/roads_data.csv --port 8501

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use road_risk::{DashboardOptions, DEFAULT_DATA_PATH, DEFAULT_TOP_N};
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod page;
mod routes;
mod state;

use state::{AppState, DatasetConfig};

const DEFAULT_PORT: u16 = 8501;

#[derive(Parser, Debug)]
#[command(
    name = "road-risk-gateway",
    about = "Serve the traffic & road safety dashboard"
)]
struct Args {
    /// Path to the road segments CSV
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// City offered by the selector (repeatable; default: cities in the data)
    #[arg(short, long = "city")]
    cities: Vec<String>,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port (falls back to ROAD_RISK_PORT, then PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Rows in the top risky roads table
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// Seed for the placeholder trend series
    #[arg(long, default_value_t = 0)]
    trend_seed: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn port(&self) -> Result<u16> {
        resolve_port(self.port, |key| std::env::var(key).ok())
    }
}

/// `--port`, then `ROAD_RISK_PORT`, then `PORT`, then [`DEFAULT_PORT`]
fn resolve_port(flag: Option<u16>, env: impl Fn(&str) -> Option<String>) -> Result<u16> {
    if let Some(port) = flag {
        return Ok(port);
    }
    match env("ROAD_RISK_PORT").or_else(|| env("PORT")) {
        Some(port) => port.parse().with_context(|| format!("invalid port {:?}", port)),
        None => Ok(DEFAULT_PORT),
    }
}

/// Full router: dashboard page, health check and `/api/v1`
pub fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/cities", get(routes::list_cities))
        .route("/dashboard", get(routes::get_dashboard))
        .route("/cities/:city/markers", get(routes::city_markers))
        .route("/cities/:city/map.geojson", get(routes::city_geojson))
        .route("/cities/:city/top", get(routes::city_top))
        .route("/cities/:city/categories", get(routes::city_categories))
        .route("/cities/:city/trend", get(routes::city_trend))
        .route("/dataset", get(routes::dataset))
        .route("/dataset/reload", post(routes::reload_dataset));

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "road_risk_gateway=debug,road_risk=debug,tower_http=debug,info"
    } else {
        "road_risk_gateway=debug,road_risk=info,info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DatasetConfig {
        path: args.data.clone(),
        cities: args.cities.clone(),
        options: DashboardOptions {
            top_n: args.top_n,
            trend_seed: args.trend_seed,
        },
    };

    let snapshot = config
        .load()
        .with_context(|| format!("failed to load dataset {}", config.path.display()))?;
    tracing::info!(
        "   Cities: {}",
        snapshot.dashboard.selector().cities().join(", ")
    );

    let app = app(AppState::new(config, snapshot));

    let addr = format!("{}:{}", args.host, args.port()?);
    tracing::info!("Road risk dashboard starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
