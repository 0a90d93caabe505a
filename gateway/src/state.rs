//! Shared gateway state
//!
//! The loaded dashboard sits behind `RwLock<Arc<..>>`: handlers clone the
//! `Arc` and work on that snapshot, a reload swaps in a new one.

use road_risk::loader::{self, SkippedRow};
use road_risk::{CitySelector, Dashboard, DashboardOptions, DataLoadError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Where the dataset comes from and how views are built over it
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub path: PathBuf,
    /// Selector cities; empty means "cities found in the data"
    pub cities: Vec<String>,
    pub options: DashboardOptions,
}

impl DatasetConfig {
    /// Read the CSV and build a fresh snapshot
    pub fn load(&self) -> Result<Snapshot, DataLoadError> {
        let loaded = loader::load(&self.path)?;
        let table = Arc::new(loaded.table);

        let dashboard = if self.cities.is_empty() {
            Dashboard::new(table, self.options)
        } else {
            Dashboard::with_selector(table, CitySelector::new(self.cities.iter().cloned()), self.options)
        };

        info!(
            "Dataset ready: {} rows, {} cities, {} skipped",
            dashboard.table().len(),
            dashboard.selector().cities().len(),
            loaded.skipped.len()
        );

        Ok(Snapshot {
            dashboard,
            skipped: loaded.skipped,
        })
    }
}

/// One loaded generation of the dataset
#[derive(Debug)]
pub struct Snapshot {
    pub dashboard: Dashboard,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DatasetConfig>,
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
}

impl AppState {
    pub fn new(config: DatasetConfig, snapshot: Snapshot) -> Self {
        Self {
            config: Arc::new(config),
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    pub async fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Re-read the dataset; on failure the current snapshot stays active
    pub async fn reload(&self) -> Result<Arc<Snapshot>, ReloadError> {
        let config = self.config.clone();
        let snapshot = tokio::task::spawn_blocking(move || config.load())
            .await
            .map_err(|e| ReloadError::Task(e.to_string()))??;

        let snapshot = Arc::new(snapshot);
        *self.snapshot.write().await = snapshot.clone();
        Ok(snapshot)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ReloadError {
    #[error(transparent)]
    Load(#[from] DataLoadError),
    #[error("Reload task failed: {0}")]
    Task(String),
}
