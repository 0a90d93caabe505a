//! Data loading from CSV files

use crate::{DataLoadError, Result, RoadSegment, RoadTable, REQUIRED_COLUMNS};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// A data row that could not be turned into a road segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub reason: String,
}

/// Result of a load: the table plus the rows left out of it
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub table: RoadTable,
    pub skipped: Vec<SkippedRow>,
}

/// Raw row from CSV; numeric cells that fail to parse become `None`
#[derive(Debug, Deserialize)]
struct RawRoadRow {
    city: String,
    road_name: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    risk_score: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
}

impl RawRoadRow {
    fn into_segment(self) -> std::result::Result<RoadSegment, String> {
        let risk_score = finite("risk_score", self.risk_score)?;
        let latitude = finite("latitude", self.latitude)?;
        let longitude = finite("longitude", self.longitude)?;

        Ok(RoadSegment {
            city: self.city,
            road_name: self.road_name,
            risk_score,
            latitude,
            longitude,
        })
    }
}

fn finite(column: &str, value: Option<f64>) -> std::result::Result<f64, String> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(format!("non-finite {}: {}", column, v)),
        None => Err(format!("missing or unparseable {}", column)),
    }
}

/// Load road segments from a CSV file
pub fn load(path: impl AsRef<Path>) -> Result<LoadedTable> {
    let path = path.as_ref();
    info!("Loading road segments from {:?}", path);

    let file = File::open(path)?;
    load_from_reader(BufReader::new(file))
}

/// Load road segments from any CSV source
pub fn load_from_reader<R: Read>(reader: R) -> Result<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                warn!("Skipping malformed record at line {}: {}", line, e);
                skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let segment = record
            .deserialize::<RawRoadRow>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(RawRoadRow::into_segment);

        match segment {
            Ok(segment) => {
                debug!("Loaded {} / {} (line {})", segment.city, segment.road_name, line);
                rows.push(segment);
            }
            Err(reason) => {
                warn!("Skipping row at line {}: {}", line, reason);
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    info!(
        "Loaded {} road segments ({} skipped)",
        rows.len(),
        skipped.len()
    );

    Ok(LoadedTable {
        table: RoadTable::new(rows),
        skipped,
    })
}
